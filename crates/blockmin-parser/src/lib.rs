//! Recursive build-block parser for HTML documents.
//!
//! Build blocks are HTML comments that wrap asset references:
//!
//! ```html
//! <!--build:js dist/app.js-->
//! <script src="a.js"></script>
//! <script src="b.js"></script>
//! <!--endbuild-->
//! ```
//!
//! [`BlockParser`] replaces each block with the output of the handler
//! registered for its type and reports the work an external build tool must
//! do as [`BuildInstruction`] events. Blocks nest: inner blocks are resolved
//! first and the outer handler sees their replacements.
//!
//! # Architecture
//!
//! - [`DirectiveGrammar`] recognizes begin, end and self-closing tags for one
//!   tag token, and [`Scanner`] walks the matches in document order
//! - [`BlockParser`] resolves blocks recursively over one shared scanner
//! - [`HandlerRegistry`] maps directive types to [`Handler`]s: the built-ins
//!   (`uncomment`, `js`, `less`, `requirejs`) or any [`BlockHandler`]
//! - Handlers report through [`HandlerContext`] into an [`EventSink`]
//!
//! # Example
//!
//! ```
//! use blockmin_parser::{BlockParser, InstructionKind, ParserConfig};
//!
//! let parser = BlockParser::new(ParserConfig::new().with_base_dir("/www")).unwrap();
//! let output = parser.parse("<!--build:requirejs js/main app.js/-->").unwrap();
//!
//! assert_eq!(output.document, r#"<script src="app.js"></script>"#);
//! let kinds: Vec<_> = output.instructions().map(|i| i.kind).collect();
//! assert_eq!(kinds, vec![InstructionKind::ModuleBundle, InstructionKind::Bundle]);
//! ```

mod args;
mod context;
mod error;
mod event;
mod grammar;
mod handlers;
mod parser;
mod tags;

pub use args::{ModuleArgs, split_args};
pub use context::{Destination, HandlerContext};
pub use error::{HandlerError, ParseError};
pub use event::{BuildInstruction, EventSink, InstructionKind, ParseEvent};
pub use grammar::{BeginTag, DirectiveGrammar, DirectiveMatch, EndTag, Scanner};
pub use handlers::{
    BUILTIN_HANDLERS, Block, BlockHandler, Handler, HandlerRegistry, JsHandler, LessHandler,
    Replacement, RequireJsHandler, UncommentHandler,
};
pub use parser::{BlockParser, FileExistsFn, ParseOutput, ParserConfig};
pub use tags::{Tag, TagExtractor};
