//! Directive comment grammar and the scan cursor over it.
//!
//! A document is never tokenized. A single pattern recognizes begin tags
//! (`<!--TAG:type args-->`, optionally self-closing with `/-->`) and end tags
//! (`<!--endTAG-->`), and [`Scanner`] walks its matches in document order.

use regex::Regex;

use crate::ParseError;

/// Compiled directive pattern for one tag token.
#[derive(Debug, Clone)]
pub struct DirectiveGrammar {
    tag: String,
    pattern: Regex,
}

impl DirectiveGrammar {
    /// Build the grammar for `tag` (e.g. `build` for `<!--build:js out.js-->`).
    ///
    /// The token must be non-empty and contain neither whitespace nor `:`.
    pub fn new(tag: &str) -> Result<Self, ParseError> {
        if tag.is_empty() || tag.contains(|c: char| c.is_whitespace() || c == ':') {
            return Err(ParseError::InvalidTag {
                tag: tag.to_owned(),
                message: "must be non-empty and contain no whitespace or ':'".to_owned(),
            });
        }

        let tag_re = regex::escape(tag);
        let source = format!(
            concat!(
                r"(?m)",
                // Begin tag: indentation, marker, type, args, self-close.
                r"(?:(?P<indent>^[ \t]+)?<!--[ \t]*{tag}:(?P<kind>[^\s/\-]+)",
                r"(?:[ ]+(?P<args>.+?))?[ ]*(?P<close>/)?-->)",
                // End tag.
                r"|(?P<end><!--[ \t]*end{tag}[ \t]*-->)",
            ),
            tag = tag_re
        );

        let pattern = Regex::new(&source).map_err(|e| ParseError::InvalidTag {
            tag: tag.to_owned(),
            message: e.to_string(),
        })?;

        Ok(Self {
            tag: tag.to_owned(),
            pattern,
        })
    }

    /// The tag token this grammar was built for.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Start scanning `haystack` from the beginning.
    #[must_use]
    pub fn scanner<'g, 'a>(&'g self, haystack: &'a str) -> Scanner<'g, 'a> {
        Scanner {
            grammar: self,
            haystack,
            pos: 0,
        }
    }

    /// Whether `haystack` contains any directive comment.
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.pattern.is_match(haystack)
    }
}

/// A begin tag, either opening a block or self-closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginTag<'a> {
    /// Byte offset of the match, including indentation.
    pub start: usize,
    /// Byte offset just past `-->`.
    pub end: usize,
    /// Verbatim matched text.
    pub text: &'a str,
    /// Leading whitespace when the tag starts a line, else empty.
    pub indent: &'a str,
    /// Directive type selecting the handler.
    pub kind: &'a str,
    /// Raw argument string.
    pub args: Option<&'a str>,
    /// Whether the tag ends with `/-->`.
    pub self_closing: bool,
}

/// A generic end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndTag<'a> {
    /// Byte offset of the match.
    pub start: usize,
    /// Byte offset just past `-->`.
    pub end: usize,
    /// Verbatim matched text.
    pub text: &'a str,
}

/// One match of the directive grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveMatch<'a> {
    /// `<!--TAG:type args-->` or `<!--TAG:type args/-->`.
    Begin(BeginTag<'a>),
    /// `<!--endTAG-->`.
    End(EndTag<'a>),
}

impl DirectiveMatch<'_> {
    /// Byte offset where the match starts.
    #[must_use]
    pub fn start(&self) -> usize {
        match self {
            Self::Begin(tag) => tag.start,
            Self::End(tag) => tag.start,
        }
    }
}

/// Scan cursor over one document.
///
/// Each call to [`next_match`](Self::next_match) continues from where the
/// previous one stopped. Recursive block resolution shares one scanner by
/// `&mut`, so nested frames always consume matches in document order.
#[derive(Debug)]
pub struct Scanner<'g, 'a> {
    grammar: &'g DirectiveGrammar,
    haystack: &'a str,
    pos: usize,
}

impl<'a> Scanner<'_, 'a> {
    /// Find the next directive after the current position and advance past it.
    pub fn next_match(&mut self) -> Option<DirectiveMatch<'a>> {
        let caps = self.grammar.pattern.captures_at(self.haystack, self.pos)?;
        let whole = caps.get(0)?;
        self.pos = whole.end();

        if caps.name("end").is_some() {
            return Some(DirectiveMatch::End(EndTag {
                start: whole.start(),
                end: whole.end(),
                text: whole.as_str(),
            }));
        }

        Some(DirectiveMatch::Begin(BeginTag {
            start: whole.start(),
            end: whole.end(),
            text: whole.as_str(),
            indent: caps.name("indent").map_or("", |m| m.as_str()),
            kind: caps.name("kind")?.as_str(),
            args: caps.name("args").map(|m| m.as_str()),
            self_closing: caps.name("close").is_some(),
        }))
    }

    /// Byte offset just past the last consumed match.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The document being scanned.
    #[must_use]
    pub fn haystack(&self) -> &'a str {
        self.haystack
    }

    /// 1-based line number of a byte offset.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.haystack[..offset].matches('\n').count() + 1
    }
}
