//! Expansion of `[blocks]` values.
//!
//! Every value accepts `${VAR}` and `${VAR:-default}`. Directory values also
//! accept a leading `~` for the home directory, so `base_dir = "~/www"` works.

use std::borrow::Cow;

use crate::{BlocksConfigRaw, ConfigError};

/// Expand every `[blocks]` value in place.
pub(crate) fn expand_blocks(blocks: &mut BlocksConfigRaw) -> Result<(), ConfigError> {
    for (value, field) in [
        (&mut blocks.tag, "blocks.tag"),
        (&mut blocks.target, "blocks.target"),
    ] {
        if let Some(raw) = value {
            *raw = expand_value(raw, field)?;
        }
    }

    for (value, field) in [
        (&mut blocks.base_dir, "blocks.base_dir"),
        (&mut blocks.source_dir, "blocks.source_dir"),
    ] {
        if let Some(raw) = value {
            *raw = expand_dir(raw, field)?;
        }
    }

    Ok(())
}

/// `${VAR}` expansion. Strings without `${` are returned as-is.
fn expand_value(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|e| unset(field, &e.cause))
}

/// `${VAR}` expansion plus a leading `~`.
fn expand_dir(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") && !value.starts_with('~') {
        return Ok(value.to_owned());
    }
    shellexpand::full_with_context(value, home_dir, lookup)
        .map(Cow::into_owned)
        .map_err(|e| unset(field, &e.cause))
}

fn lookup(var: &str) -> Result<Option<String>, String> {
    std::env::var(var).map(Some).map_err(|_| var.to_owned())
}

fn home_dir() -> Option<String> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
}

fn unset(field: &str, var: &str) -> ConfigError {
    ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{var}}} not set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks(base_dir: &str) -> BlocksConfigRaw {
        BlocksConfigRaw {
            base_dir: Some(base_dir.to_owned()),
            ..BlocksConfigRaw::default()
        }
    }

    #[test]
    fn test_expand_var_in_dir() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("BLOCKMIN_TEST_OUT", "public");
        }
        let mut raw = blocks("${BLOCKMIN_TEST_OUT}/assets");
        expand_blocks(&mut raw).unwrap();
        assert_eq!(raw.base_dir.as_deref(), Some("public/assets"));
        unsafe {
            std::env::remove_var("BLOCKMIN_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_default_target() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("BLOCKMIN_TEST_UNSET_TARGET");
        }
        let mut raw = BlocksConfigRaw {
            target: Some("${BLOCKMIN_TEST_UNSET_TARGET:-release}".to_owned()),
            ..BlocksConfigRaw::default()
        };
        expand_blocks(&mut raw).unwrap();
        assert_eq!(raw.target.as_deref(), Some("release"));
    }

    #[test]
    fn test_home_in_dir() {
        let Some(home) = home_dir() else {
            return;
        };
        let mut raw = blocks("~/www");
        expand_blocks(&mut raw).unwrap();
        assert_eq!(raw.base_dir, Some(format!("{home}/www")));
    }

    #[test]
    fn test_tilde_in_tag_kept() {
        let mut raw = BlocksConfigRaw {
            tag: Some("~build".to_owned()),
            ..BlocksConfigRaw::default()
        };
        expand_blocks(&mut raw).unwrap();
        assert_eq!(raw.tag.as_deref(), Some("~build"));
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::remove_var("BLOCKMIN_TEST_MISSING");
        }
        let mut raw = BlocksConfigRaw {
            source_dir: Some("${BLOCKMIN_TEST_MISSING}/src".to_owned()),
            ..BlocksConfigRaw::default()
        };
        let err = expand_blocks(&mut raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in blocks.source_dir: ${BLOCKMIN_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_literals_unchanged() {
        let mut raw = blocks("$HOME/dist");
        expand_blocks(&mut raw).unwrap();
        assert_eq!(raw.base_dir.as_deref(), Some("$HOME/dist"));
    }
}
