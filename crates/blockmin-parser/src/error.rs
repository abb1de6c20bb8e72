//! Error types for block parsing.
//!
//! Only fatal conditions are errors. Recoverable per-tag problems (a script
//! without `src`, a missing asset file) are reported as
//! [`ParseEvent::Warning`](crate::ParseEvent::Warning) and never surface here.

/// Fatal error raised by a block handler.
///
/// Returning one of these from [`BlockHandler::process`](crate::BlockHandler::process)
/// aborts the whole parse.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The directive is missing arguments the handler requires.
    #[error("Missing arguments. Syntax: {syntax}")]
    MissingArguments {
        /// Usage string for the directive.
        syntax: &'static str,
    },
    /// Trailing options of a directive are not a valid JSON object.
    #[error("Invalid JSON ({source}): {input}")]
    InvalidJson {
        /// The text that failed to parse.
        input: String,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Handler-specific failure, used by caller-supplied handlers.
    #[error("{0}")]
    Custom(String),
}

/// Fatal error that aborts a parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The directive pattern could not be built from the configured tag token.
    #[error("Invalid directive tag {tag:?}: {message}")]
    InvalidTag {
        /// Configured tag token.
        tag: String,
        /// Why the token was rejected.
        message: String,
    },
    /// A begin tag has no matching end tag anywhere after it.
    #[error("Missing end tag for block on line {line}. {begin_tag}")]
    MissingEndTag {
        /// 1-based line of the begin tag.
        line: usize,
        /// Verbatim text of the begin tag.
        begin_tag: String,
    },
    /// A handler failed fatally.
    #[error("Block '{kind}' failed: {source}")]
    Handler {
        /// Directive type of the failing block.
        kind: String,
        /// Handler error.
        #[source]
        source: HandlerError,
    },
}
