//! Colored terminal output utilities.
//!
//! Everything goes to stderr; stdout is reserved for the rewritten document.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    bold: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print parse warnings (yellow), one per line.
    pub(crate) fn warnings<'a>(&self, warnings: impl Iterator<Item = &'a str>) {
        for warning in warnings {
            let line = format!("Warning: {warning}");
            let _ = self.term.write_line(&self.yellow.apply_to(line).to_string());
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a labelled count, with the count highlighted.
    pub(crate) fn stat(&self, label: &str, count: usize) {
        let _ = self
            .term
            .write_line(&format!("{label}: {}", self.bold.apply_to(count)));
    }
}
