//! Element extraction from HTML fragments.
//!
//! Handlers use this to find `<script>` and `<link>` references inside a
//! block. Only double-quoted, non-empty attribute values are recognized.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Regex to match one `name="value"` attribute preceded by a space.
static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i) ([a-z0-9_\-]+)="([^"]+)""#).unwrap());

/// An element occurrence and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Verbatim matched tag text, for diagnostics.
    pub html: String,
    /// Attribute values keyed by lowercased attribute name.
    pub attrs: HashMap<String, String>,
}

impl Tag {
    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Extracts occurrences of one element from HTML fragments.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    pattern: Regex,
}

impl TagExtractor {
    /// Create an extractor for `element` (matched case-insensitively).
    pub fn new(element: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(?i)<{}( .+?)/?>", regex::escape(element)))?;
        Ok(Self { pattern })
    }

    /// Extract all occurrences from `html`, in document order.
    ///
    /// # Example
    ///
    /// ```
    /// use blockmin_parser::TagExtractor;
    ///
    /// let scripts = TagExtractor::new("script").unwrap();
    /// let tags = scripts.extract(r#"<script src="a.js"></script><script src="b.js" defer="defer"></script>"#);
    /// assert_eq!(tags.len(), 2);
    /// assert_eq!(tags[1].get("src"), Some("b.js"));
    /// assert_eq!(tags[1].get("defer"), Some("defer"));
    /// ```
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<Tag> {
        self.pattern
            .captures_iter(html)
            .map(|caps| {
                let attrs = caps.get(1).map_or("", |m| m.as_str());
                Tag {
                    html: caps[0].to_owned(),
                    attrs: ATTR_RE
                        .captures_iter(attrs)
                        .map(|a| (a[1].to_ascii_lowercase(), a[2].to_owned()))
                        .collect(),
                }
            })
            .collect()
    }
}

/// Shared extractor for `<script>` elements.
pub(crate) static SCRIPT_TAGS: LazyLock<TagExtractor> =
    LazyLock::new(|| TagExtractor::new("script").unwrap());

/// Shared extractor for `<link>` elements.
pub(crate) static LINK_TAGS: LazyLock<TagExtractor> =
    LazyLock::new(|| TagExtractor::new("link").unwrap());
