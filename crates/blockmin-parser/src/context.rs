//! Handler context.
//!
//! Gives handlers path resolution, file existence checks and the event sink.

use std::path::{Path, PathBuf};

use crate::event::{BuildInstruction, EventSink, ParseEvent};

/// Output path of an aggregated asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Path as written into the rewritten document.
    pub short: String,
    /// Path under the base directory where the build tool writes.
    pub full: PathBuf,
}

impl Destination {
    /// Resolve `short` under `base_dir`.
    ///
    /// `short` is a document path, so a leading `/` stays inside `base_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use blockmin_parser::Destination;
    ///
    /// let dest = Destination::resolve("/js/app.js", Path::new("/www"));
    /// assert_eq!(dest.short, "/js/app.js");
    /// assert_eq!(dest.full, Path::new("/www/js/app.js"));
    /// ```
    #[must_use]
    pub fn resolve(short: &str, base_dir: &Path) -> Self {
        Self {
            short: short.to_owned(),
            full: base_dir.join(short.trim_start_matches('/')),
        }
    }

    /// `full` as a string, for instruction sources and bundler options.
    #[must_use]
    pub fn full_str(&self) -> String {
        self.full.to_string_lossy().into_owned()
    }
}

/// Context passed to each [`BlockHandler`](crate::BlockHandler) invocation.
pub struct HandlerContext<'a> {
    /// Directory destinations are resolved under.
    pub base_dir: &'a Path,
    /// Directory asset references (`src`, `href`) are resolved under.
    pub source_dir: &'a Path,
    /// Default build target.
    pub target: &'a str,
    pub(crate) file_exists: &'a dyn Fn(&Path) -> bool,
    pub(crate) sink: &'a mut dyn EventSink,
}

impl HandlerContext<'_> {
    /// Resolve an output path under the base directory.
    #[must_use]
    pub fn destination(&self, short: &str) -> Destination {
        Destination::resolve(short, self.base_dir)
    }

    /// Whether an asset referenced from the document exists.
    ///
    /// Like [`Destination::resolve`], a site-root reference (`/js/a.js`)
    /// resolves inside the source directory.
    #[must_use]
    pub fn asset_exists(&self, reference: &str) -> bool {
        (self.file_exists)(&self.source_dir.join(reference.trim_start_matches('/')))
    }

    /// Report progress.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.emit_notice(false, message.into());
    }

    /// Report progress that only matters in verbose output.
    pub fn verbose(&mut self, message: impl Into<String>) {
        self.emit_notice(true, message.into());
    }

    fn emit_notice(&mut self, verbose: bool, message: String) {
        if verbose {
            tracing::debug!("{message}");
        } else {
            tracing::info!("{message}");
        }
        self.sink.emit(ParseEvent::Notice { verbose, message });
    }

    /// Report a recoverable problem. The caller skips the offending tag.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.sink.emit(ParseEvent::Warning { message });
    }

    /// Request work from an external build tool.
    pub fn instruct(&mut self, instruction: BuildInstruction) {
        tracing::debug!(
            kind = ?instruction.kind,
            target = %instruction.target,
            src = %instruction.src,
            dest = %instruction.dest.display(),
            "Build instruction"
        );
        self.sink.emit(ParseEvent::Instruction(instruction));
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;

    #[test]
    fn test_destination_relative() {
        let dest = Destination::resolve("js/app.js", Path::new("/www"));
        assert_eq!(dest.full, PathBuf::from("/www/js/app.js"));
        assert_eq!(dest.full_str(), "/www/js/app.js");
    }

    #[test]
    fn test_asset_exists_resolves_under_source_dir() {
        let mut fixture = Fixture::new(&["a.js"]);
        fixture.run(|ctx| {
            assert!(ctx.asset_exists("a.js"));
            assert!(!ctx.asset_exists("b.js"));
        });
    }

    #[test]
    fn test_site_root_asset_stays_in_source_dir() {
        let mut fixture = Fixture::new(&["js/a.js"]);
        fixture.run(|ctx| {
            assert!(ctx.asset_exists("/js/a.js"));
            assert!(!ctx.asset_exists("/js/b.js"));
        });
    }

    #[test]
    fn test_events_reach_sink() {
        let mut fixture = Fixture::new(&[]);
        fixture.run(|ctx| {
            ctx.verbose("Set destination");
            ctx.warn("Tag missing src attribute");
            ctx.instruct(BuildInstruction::bundle("dist", "a.js", "/www/out.js"));
        });
        assert_eq!(fixture.events.len(), 3);
        assert_eq!(fixture.warnings(), vec!["Tag missing src attribute"]);
        assert_eq!(fixture.instructions().len(), 1);
    }
}
