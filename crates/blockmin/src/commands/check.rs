//! `blockmin check` command implementation.

use std::path::PathBuf;

use blockmin_parser::{EventSink, ParseEvent};
use clap::Args;

use super::{BlockArgs, read_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// HTML document to check.
    input: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    blocks: BlockArgs,
}

/// Event tallies for one document.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    tag: String,
    target: String,
    blocks: usize,
    instructions: usize,
    warnings: Vec<String>,
}

impl EventSink for Summary {
    fn emit(&mut self, event: ParseEvent) {
        match event {
            ParseEvent::BlockEnd { .. } | ParseEvent::BlockSingle { .. } => self.blocks += 1,
            ParseEvent::Instruction(_) => self.instructions += 1,
            ParseEvent::Warning { message } => self.warnings.push(message),
            ParseEvent::BlockBegin { .. } | ParseEvent::Notice { .. } => {}
        }
    }
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let summary = self.summarize()?;

        output.info(&format!(
            "Checked {} (tag '{}', target '{}')",
            self.input.display(),
            summary.tag,
            summary.target
        ));
        output.warnings(summary.warnings.iter().map(String::as_str));
        output.stat("Blocks", summary.blocks);
        output.stat("Build instructions", summary.instructions);
        output.stat("Warnings", summary.warnings.len());

        if self.strict && !summary.warnings.is_empty() {
            return Err(CliError::Validation(format!(
                "{} has {} warning(s)",
                self.input.display(),
                summary.warnings.len()
            )));
        }

        output.success(&format!("{} OK", self.input.display()));
        Ok(())
    }

    fn summarize(&self) -> Result<Summary, CliError> {
        let parser = self.blocks.parser()?;
        let document = read_document(&self.input)?;

        let mut summary = Summary {
            tag: parser.grammar().tag().to_owned(),
            target: parser.config().target.clone(),
            ..Summary::default()
        };
        parser.parse_with(&document, &mut summary)?;
        Ok(summary)
    }
}
