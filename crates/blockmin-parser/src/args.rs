//! Directive argument parsing.
//!
//! Directive arguments are the free text between the type and `-->`:
//! `<!--build:requirejs app/main dist/app.js release {"optimize": "none"}-->`.

use serde_json::{Map, Value};

use crate::HandlerError;

/// Split a raw argument string into whitespace-separated tokens.
///
/// With `limit = Some(n)` at most `n` tokens are returned and the last one
/// absorbs the remainder of the string. `Some(1)` returns the input as-is.
/// `None` (or `Some(0)`) splits without a limit.
///
/// # Example
///
/// ```
/// use blockmin_parser::split_args;
///
/// assert_eq!(split_args("a b c d", Some(2)), vec!["a", "b c d"]);
/// assert_eq!(split_args("a b c", Some(1)), vec!["a b c"]);
/// assert_eq!(split_args("a\tb  c", None), vec!["a", "b", "c"]);
/// ```
#[must_use]
pub fn split_args(args: &str, limit: Option<usize>) -> Vec<&str> {
    if limit == Some(1) {
        return vec![args];
    }

    let mut tokens = Vec::new();
    let mut rest = args.trim_matches(is_separator);

    while !rest.is_empty() {
        if limit.is_some_and(|n| tokens.len() + 1 == n) {
            tokens.push(rest);
            break;
        }
        match rest.find(is_separator) {
            Some(idx) => {
                tokens.push(&rest[..idx]);
                rest = rest[idx..].trim_start_matches(is_separator);
            }
            None => {
                tokens.push(rest);
                break;
            }
        }
    }

    tokens
}

fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Arguments of a module-loader bootstrap directive.
///
/// Grammar: `<main> [<dest> [<target>]] [<options-json>]`. A token that starts
/// with `{` begins the JSON options, so `dest` and `target` can never start
/// with a brace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleArgs {
    /// Main module path, without the `.js` extension.
    pub main: String,
    /// Output path override.
    pub dest: Option<String>,
    /// Build target override.
    pub target: Option<String>,
    /// Extra module bundler options.
    pub options: Map<String, Value>,
    /// Tokens after `target` that were not JSON and were ignored.
    pub ignored: Option<String>,
}

impl ModuleArgs {
    /// Usage string reported when arguments are missing.
    pub const SYNTAX: &'static str = "<data-main> [<dest> [<target>]] [<options-json>]";

    /// Parse a raw argument string.
    pub fn parse(args: Option<&str>) -> Result<Self, HandlerError> {
        let missing = || HandlerError::MissingArguments {
            syntax: Self::SYNTAX,
        };

        let raw = args.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(missing)?;
        let (main, mut rest) = next_token(raw);
        let mut parsed = Self {
            main: main.to_owned(),
            ..Self::default()
        };

        if !rest.is_empty() && !rest.starts_with('{') {
            let (dest, after) = next_token(rest);
            parsed.dest = Some(dest.to_owned());
            rest = after;
        }

        if !rest.is_empty() && !rest.starts_with('{') {
            let (target, after) = next_token(rest);
            parsed.target = Some(target.to_owned());
            rest = after;
        }

        if rest.starts_with('{') {
            parsed.options =
                serde_json::from_str(rest).map_err(|source| HandlerError::InvalidJson {
                    input: rest.to_owned(),
                    source,
                })?;
        } else if !rest.is_empty() {
            parsed.ignored = Some(rest.to_owned());
        }

        Ok(parsed)
    }
}

/// Split off the first token, returning it and the trimmed remainder.
fn next_token(s: &str) -> (&str, &str) {
    let tokens = split_args(s, Some(2));
    match tokens.as_slice() {
        [first, rest] => (*first, *rest),
        [first] => (*first, ""),
        _ => ("", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_split_with_limit() {
        assert_eq!(split_args("a b c d", Some(2)), vec!["a", "b c d"]);
        assert_eq!(split_args("a b c d", Some(3)), vec!["a", "b", "c d"]);
    }

    #[test]
    fn test_split_limit_one_unchanged() {
        assert_eq!(split_args("a b c", Some(1)), vec!["a b c"]);
        assert_eq!(split_args(" a ", Some(1)), vec![" a "]);
    }

    #[test]
    fn test_split_unlimited() {
        assert_eq!(split_args("a  b\tc", None), vec!["a", "b", "c"]);
        assert_eq!(split_args("a b", Some(0)), vec!["a", "b"]);
    }

    #[test]
    fn test_split_fewer_tokens_than_limit() {
        assert_eq!(split_args("a", Some(3)), vec!["a"]);
        assert_eq!(split_args("a b", Some(5)), vec!["a", "b"]);
    }

    #[test]
    fn test_split_trims_outer_whitespace() {
        assert_eq!(split_args("  a b  ", None), vec!["a", "b"]);
        assert!(split_args("   ", None).is_empty());
        assert!(split_args("", Some(2)).is_empty());
    }

    #[test]
    fn test_module_args_main_only() {
        let args = ModuleArgs::parse(Some("app")).unwrap();
        assert_eq!(args.main, "app");
        assert_eq!(args.dest, None);
        assert_eq!(args.target, None);
        assert!(args.options.is_empty());
    }

    #[test]
    fn test_module_args_all_positional() {
        let args = ModuleArgs::parse(Some("js/main dist/main.js release")).unwrap();
        assert_eq!(args.main, "js/main");
        assert_eq!(args.dest.as_deref(), Some("dist/main.js"));
        assert_eq!(args.target.as_deref(), Some("release"));
    }

    #[test]
    fn test_module_args_json_after_main() {
        let args = ModuleArgs::parse(Some(r#"app {"optimize": "none", "wrap": true}"#)).unwrap();
        assert_eq!(args.dest, None);
        assert_eq!(args.options.get("optimize"), Some(&json!("none")));
        assert_eq!(args.options.get("wrap"), Some(&json!(true)));
    }

    #[test]
    fn test_module_args_json_after_dest() {
        let args = ModuleArgs::parse(Some(r#"app out.js {"a": 1}"#)).unwrap();
        assert_eq!(args.dest.as_deref(), Some("out.js"));
        assert_eq!(args.target, None);
        assert_eq!(args.options.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_module_args_json_with_spaces_kept_whole() {
        let args = ModuleArgs::parse(Some(r#"app out.js t { "paths" : { "x" : "y z" } }"#)).unwrap();
        assert_eq!(args.options.get("paths"), Some(&json!({"x": "y z"})));
    }

    #[test]
    fn test_module_args_ignored_tail() {
        let args = ModuleArgs::parse(Some("app out.js t extra words")).unwrap();
        assert_eq!(args.ignored.as_deref(), Some("extra words"));
    }

    #[test]
    fn test_module_args_missing() {
        assert!(matches!(
            ModuleArgs::parse(None),
            Err(HandlerError::MissingArguments { .. })
        ));
        assert!(ModuleArgs::parse(Some("  ")).is_err());
    }

    #[test]
    fn test_module_args_invalid_json() {
        let err = ModuleArgs::parse(Some("app {not json}")).unwrap_err();
        match err {
            HandlerError::InvalidJson { input, .. } => assert_eq!(input, "{not json}"),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn test_module_args_json_must_be_object() {
        assert!(ModuleArgs::parse(Some("app {}")).unwrap().options.is_empty());
        assert!(ModuleArgs::parse(Some("app {1}")).is_err());
    }
}
