//! Recursive block parser.
//!
//! Walks directive matches with one shared [`Scanner`], resolves nested blocks
//! innermost first and splices handler output back into the document.

use std::path::{Path, PathBuf};

use crate::event::{BuildInstruction, EventSink, ParseEvent};
use crate::grammar::{BeginTag, DirectiveGrammar, DirectiveMatch, Scanner};
use crate::handlers::{Block, BlockHandler, Handler, HandlerRegistry};
use crate::{HandlerContext, ParseError};

/// Type alias for the file existence callback.
pub type FileExistsFn = dyn Fn(&Path) -> bool + Send + Sync;

/// Configuration for the block parser.
pub struct ParserConfig {
    /// Tag token of the directive grammar (`build` in `<!--build:js x-->`).
    pub tag: String,
    /// Directory destinations are resolved under.
    pub base_dir: PathBuf,
    /// Directory asset references in the document are resolved under.
    pub source_dir: PathBuf,
    /// Build target used unless a directive overrides it.
    pub target: String,
    /// Callback deciding whether an asset file exists.
    ///
    /// Default: [`Path::is_file`]
    pub file_exists: Option<Box<FileExistsFn>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: "build".to_owned(),
            base_dir: PathBuf::from("."),
            source_dir: PathBuf::from("."),
            target: "default".to_owned(),
            file_exists: None,
        }
    }

    /// Set the directive tag token.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the destination base directory.
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Set the directory asset references are resolved under.
    #[must_use]
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = source_dir.into();
        self
    }

    /// Set the default build target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the file existence callback.
    #[must_use]
    pub fn with_file_exists<F>(mut self, file_exists: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.file_exists = Some(Box::new(file_exists));
        self
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// Rewritten document.
    pub document: String,
    /// Events in emission order.
    pub events: Vec<ParseEvent>,
}

impl ParseOutput {
    /// Build instructions in emission order.
    pub fn instructions(&self) -> impl Iterator<Item = &BuildInstruction> {
        self.events.iter().filter_map(|event| match event {
            ParseEvent::Instruction(instruction) => Some(instruction),
            _ => None,
        })
    }

    /// Recoverable problems reported while parsing.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            ParseEvent::Warning { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

/// Parser for build-block directives in HTML documents.
///
/// # Example
///
/// ```
/// use blockmin_parser::{BlockParser, ParserConfig};
///
/// let config = ParserConfig::new()
///     .with_base_dir("/www")
///     .with_file_exists(|_| true);
/// let parser = BlockParser::new(config).unwrap();
///
/// let html = "<head>\n  <!--build:js app.js-->\n  <script src=\"a.js\"></script>\n  <!--endbuild-->\n</head>";
/// let output = parser.parse(html).unwrap();
/// assert_eq!(output.document, "<head>\n  <script src=\"app.js\"></script>\n</head>");
/// assert_eq!(output.instructions().count(), 1);
/// ```
pub struct BlockParser {
    config: ParserConfig,
    grammar: DirectiveGrammar,
    registry: HandlerRegistry,
}

impl BlockParser {
    /// Create a parser with the built-in handlers.
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        Self::with_registry(config, HandlerRegistry::with_builtins())
    }

    /// Create a parser dispatching to `registry`.
    pub fn with_registry(
        config: ParserConfig,
        registry: HandlerRegistry,
    ) -> Result<Self, ParseError> {
        let grammar = DirectiveGrammar::new(&config.tag)?;
        Ok(Self {
            config,
            grammar,
            registry,
        })
    }

    /// Register a handler, replacing any handler of the same name.
    #[must_use]
    pub fn with_handler<H: BlockHandler + 'static>(mut self, handler: H) -> Self {
        self.registry.register(handler);
        self
    }

    /// Serve directive type `alias` with the built-in handler `builtin`.
    ///
    /// Returns `None` if `builtin` is not a built-in handler name.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, builtin: &str) -> Option<Self> {
        let handler = Handler::builtin(builtin)?;
        self.registry.insert(alias, handler);
        Some(self)
    }

    /// The parser configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The directive grammar.
    #[must_use]
    pub fn grammar(&self) -> &DirectiveGrammar {
        &self.grammar
    }

    /// Parse `document`, collecting events.
    pub fn parse(&self, document: &str) -> Result<ParseOutput, ParseError> {
        let mut events = Vec::new();
        let document = self.parse_with(document, &mut events)?;
        Ok(ParseOutput { document, events })
    }

    /// Parse `document`, sending events to `sink`.
    ///
    /// On error, events already sent stay sent, but no document is produced.
    pub fn parse_with(&self, document: &str, sink: &mut dyn EventSink) -> Result<String, ParseError> {
        let mut scanner = self.grammar.scanner(document);
        let mut output = String::with_capacity(document.len());
        let mut last = 0;

        while let Some(found) = scanner.next_match() {
            output.push_str(&document[last..found.start()]);

            match found {
                DirectiveMatch::Begin(tag) => {
                    output.push_str(tag.indent);
                    let replacement = self.resolve_block(&mut scanner, &tag, sink)?;
                    output.push_str(&replacement);
                }
                DirectiveMatch::End(end) => {
                    let line = scanner.line_of(end.start);
                    let message = format!("Stray end tag with no open block on line {line}: {}", end.text);
                    tracing::warn!("{message}");
                    sink.emit(ParseEvent::Warning { message });
                    output.push_str(end.text);
                }
            }

            last = scanner.position();
        }

        output.push_str(&document[last..]);
        Ok(output)
    }

    /// Resolve one block and everything nested in it.
    ///
    /// On return, `scanner` sits just past this block's end tag (or past the
    /// begin tag itself when self-closing).
    fn resolve_block(
        &self,
        scanner: &mut Scanner<'_, '_>,
        tag: &BeginTag<'_>,
        sink: &mut dyn EventSink,
    ) -> Result<String, ParseError> {
        let kind = tag.kind.to_owned();
        let args = tag.args.map(str::to_owned);
        let begin_tag = tag.text.to_owned();

        if tag.self_closing {
            tracing::debug!(kind = %kind, "Single block");
            sink.emit(ParseEvent::BlockSingle {
                kind,
                args,
                begin_tag,
            });
            return self.dispatch(tag, None, sink);
        }

        tracing::debug!(kind = %kind, "Block begin");
        sink.emit(ParseEvent::BlockBegin {
            kind: kind.clone(),
            args: args.clone(),
            begin_tag: begin_tag.clone(),
        });

        let document = scanner.haystack();
        let mut contents = String::new();
        let mut last = tag.end;

        let end = loop {
            match scanner.next_match() {
                None => {
                    return Err(ParseError::MissingEndTag {
                        line: scanner.line_of(tag.start + tag.indent.len()),
                        begin_tag,
                    });
                }
                Some(DirectiveMatch::End(end)) => break end,
                Some(DirectiveMatch::Begin(child)) => {
                    contents.push_str(&document[last..child.start]);
                    // The child's own indentation, not the enclosing block's.
                    contents.push_str(child.indent);
                    let replacement = self.resolve_block(scanner, &child, sink)?;
                    contents.push_str(&replacement);
                    last = scanner.position();
                }
            }
        };

        contents.push_str(&document[last..end.start]);

        let parsed = self.dispatch(tag, Some(&contents), sink)?;

        tracing::debug!(kind = %kind, "Block end");
        sink.emit(ParseEvent::BlockEnd {
            kind,
            args,
            begin_tag,
            contents,
        });

        Ok(parsed)
    }

    /// Run the handler for `tag` and render its replacement.
    fn dispatch(
        &self,
        tag: &BeginTag<'_>,
        contents: Option<&str>,
        sink: &mut dyn EventSink,
    ) -> Result<String, ParseError> {
        let Some(handler) = self.registry.get(tag.kind) else {
            tracing::debug!(kind = %tag.kind, "No handler, dropping block");
            return Ok(String::new());
        };

        let block = Block {
            kind: tag.kind,
            args: tag.args,
            contents,
            indent: tag.indent,
        };

        let is_file = |path: &Path| path.is_file();
        let file_exists: &dyn Fn(&Path) -> bool = match self.config.file_exists.as_deref() {
            Some(f) => f,
            None => &is_file,
        };

        let mut ctx = HandlerContext {
            base_dir: &self.config.base_dir,
            source_dir: &self.config.source_dir,
            target: &self.config.target,
            file_exists,
            sink,
        };

        let replacement = handler
            .process(&block, &mut ctx)
            .map_err(|source| ParseError::Handler {
                kind: tag.kind.to_owned(),
                source,
            })?;

        Ok(replacement.render(tag.indent))
    }
}
