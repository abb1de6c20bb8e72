//! Block handlers and the registry that dispatches to them.
//!
//! # Built-in handlers
//!
//! | Type        | Behavior                                              |
//! |-------------|-------------------------------------------------------|
//! | `uncomment` | Strip `<!--`/`-->` around the block contents          |
//! | `js`        | Bundle `<script>` references into one output script   |
//! | `less`      | Compile `<link>` stylesheets into one output sheet    |
//! | `requirejs` | Emit a module-bundler bootstrap and its output script |
//!
//! Caller-supplied handlers implementing [`BlockHandler`] replace built-ins
//! of the same name when registered.

mod js;
mod less;
mod requirejs;
mod uncomment;

use std::collections::HashMap;
use std::fmt;

use crate::{HandlerContext, HandlerError};

pub use js::JsHandler;
pub use less::LessHandler;
pub use requirejs::RequireJsHandler;
pub use uncomment::UncommentHandler;

/// Names of the built-in handlers.
pub const BUILTIN_HANDLERS: [&str; 4] = ["uncomment", "js", "less", "requirejs"];

/// A fully resolved block handed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Directive type.
    pub kind: &'a str,
    /// Raw argument string.
    pub args: Option<&'a str>,
    /// Inner text with nested blocks already replaced. `None` when self-closing.
    pub contents: Option<&'a str>,
    /// Indentation of the begin tag.
    pub indent: &'a str,
}

/// Replacement text produced by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// Used verbatim.
    Text(String),
    /// Joined with a newline plus the block's indentation.
    Lines(Vec<String>),
    /// Block is removed.
    Empty,
}

impl Replacement {
    /// Create a verbatim text replacement.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Render to the final string for a block indented by `indent`.
    ///
    /// # Example
    ///
    /// ```
    /// use blockmin_parser::Replacement;
    ///
    /// let lines = Replacement::Lines(vec!["<a>".into(), "<b>".into()]);
    /// assert_eq!(lines.render("  "), "<a>\n  <b>");
    /// ```
    #[must_use]
    pub fn render(self, indent: &str) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => lines.join(&format!("\n{indent}")),
            Self::Empty => String::new(),
        }
    }
}

/// Handler for one directive type.
///
/// # Example
///
/// ```
/// use blockmin_parser::{Block, BlockHandler, HandlerContext, HandlerError, Replacement};
///
/// struct Banner;
///
/// impl BlockHandler for Banner {
///     fn name(&self) -> &str { "banner" }
///
///     fn process(
///         &self,
///         block: &Block<'_>,
///         _ctx: &mut HandlerContext<'_>,
///     ) -> Result<Replacement, HandlerError> {
///         Ok(Replacement::text(format!("<!-- {} -->", block.args.unwrap_or("built"))))
///     }
/// }
/// ```
pub trait BlockHandler: Send + Sync {
    /// Directive type this handler serves (e.g. `js`).
    fn name(&self) -> &str;

    /// Produce the replacement for `block`.
    ///
    /// Recoverable problems go through [`HandlerContext::warn`]; an `Err`
    /// aborts the whole parse.
    fn process(
        &self,
        block: &Block<'_>,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<Replacement, HandlerError>;
}

/// A registered handler: one of the built-ins or a caller-supplied one.
pub enum Handler {
    /// [`UncommentHandler`].
    Uncomment,
    /// [`JsHandler`].
    Js,
    /// [`LessHandler`].
    Less,
    /// [`RequireJsHandler`].
    RequireJs,
    /// Caller-supplied handler.
    Custom(Box<dyn BlockHandler>),
}

impl Handler {
    /// Look up a built-in by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "uncomment" => Some(Self::Uncomment),
            "js" => Some(Self::Js),
            "less" => Some(Self::Less),
            "requirejs" => Some(Self::RequireJs),
            _ => None,
        }
    }

    /// Run the handler.
    pub fn process(
        &self,
        block: &Block<'_>,
        ctx: &mut HandlerContext<'_>,
    ) -> Result<Replacement, HandlerError> {
        match self {
            Self::Uncomment => UncommentHandler.process(block, ctx),
            Self::Js => JsHandler.process(block, ctx),
            Self::Less => LessHandler.process(block, ctx),
            Self::RequireJs => RequireJsHandler.process(block, ctx),
            Self::Custom(handler) => handler.process(block, ctx),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncomment => f.write_str("Uncomment"),
            Self::Js => f.write_str("Js"),
            Self::Less => f.write_str("Less"),
            Self::RequireJs => f.write_str("RequireJs"),
            Self::Custom(handler) => write!(f, "Custom({})", handler.name()),
        }
    }
}

/// Directive type to handler mapping.
///
/// Built once when the parser is configured. Later registrations replace
/// earlier ones, so overrides registered after the built-ins win.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Registry with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with all built-in handlers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for name in BUILTIN_HANDLERS {
            if let Some(handler) = Handler::builtin(name) {
                registry.insert(name, handler);
            }
        }
        registry
    }

    /// Register `handler` for directive type `name`, replacing any existing one.
    pub fn insert(&mut self, name: impl Into<String>, handler: Handler) {
        let name = name.into();
        if let Some(previous) = self.handlers.insert(name.clone(), handler) {
            tracing::debug!(kind = %name, replaced = ?previous, "Handler overridden");
        }
    }

    /// Register a caller-supplied handler under its own name.
    pub fn register<H: BlockHandler + 'static>(&mut self, handler: H) {
        let name = handler.name().to_owned();
        self.insert(name, Handler::Custom(Box::new(handler)));
    }

    /// Handler for a directive type.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&Handler> {
        self.handlers.get(kind)
    }

    /// Whether a handler is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }
}
