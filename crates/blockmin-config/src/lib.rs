//! Configuration management for blockmin.
//!
//! Parses `blockmin.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [blocks]
//! tag = "build"
//! base_dir = "dist"
//! source_dir = "."
//! target = "default"
//!
//! [aliases]
//! scripts = "js"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! All `[blocks]` values support `${VAR}` and `${VAR:-default}`;
//! `base_dir` and `source_dir` also expand a leading `~`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use blockmin_parser::BUILTIN_HANDLERS;
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "blockmin.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override directive tag token.
    pub tag: Option<String>,
    /// Override destination base directory.
    pub base_dir: Option<PathBuf>,
    /// Override asset source directory.
    pub source_dir: Option<PathBuf>,
    /// Override default build target.
    pub target: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Block settings as written in TOML.
    blocks: BlocksConfigRaw,
    /// Directive type aliases, mapping a type to a built-in handler name.
    pub aliases: BTreeMap<String, String>,

    /// Resolved block settings (set after loading).
    #[serde(skip)]
    pub blocks_resolved: BlocksConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BlocksConfigRaw {
    tag: Option<String>,
    base_dir: Option<String>,
    source_dir: Option<String>,
    target: Option<String>,
}

/// Resolved block settings with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocksConfig {
    /// Directive tag token.
    pub tag: String,
    /// Directory destinations are written under.
    pub base_dir: PathBuf,
    /// Directory asset references are resolved under.
    pub source_dir: PathBuf,
    /// Default build target.
    pub target: String,
}

impl Default for BlocksConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

impl BlocksConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            tag: "build".to_owned(),
            base_dir: base.join("dist"),
            source_dir: base.to_path_buf(),
            target: "default".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`blocks.base_dir`").
        field: String,
        /// Error message (e.g., "${`OUT_DIR`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `blockmin.toml` in the current directory and
    /// its parents, falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after path resolution and take precedence.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(tag) = &settings.tag {
            self.blocks_resolved.tag.clone_from(tag);
        }
        if let Some(base_dir) = &settings.base_dir {
            self.blocks_resolved.base_dir.clone_from(base_dir);
        }
        if let Some(source_dir) = &settings.source_dir {
            self.blocks_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(target) = &settings.target {
            self.blocks_resolved.target.clone_from(target);
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let blocks = &self.blocks_resolved;

        require_non_empty(&blocks.tag, "blocks.tag")?;
        if blocks.tag.contains(|c: char| c.is_whitespace() || c == ':') {
            return Err(ConfigError::Validation(format!(
                "blocks.tag cannot contain whitespace or ':' (got {:?})",
                blocks.tag
            )));
        }
        require_non_empty(&blocks.target, "blocks.target")?;

        for (alias, handler) in &self.aliases {
            if !BUILTIN_HANDLERS.contains(&handler.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "aliases.{alias} must name a built-in handler ({}), got {handler:?}",
                    BUILTIN_HANDLERS.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Search for the config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(&std::env::current_dir().ok()?)
    }

    /// Search for the config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            blocks_resolved: BlocksConfig::with_base(base),
            ..Self::default()
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_blocks(&mut self.blocks)
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = BlocksConfig::with_base(config_dir);
        let blocks = &self.blocks;

        self.blocks_resolved = BlocksConfig {
            tag: blocks.tag.clone().unwrap_or(defaults.tag),
            base_dir: blocks
                .base_dir
                .as_deref()
                .map_or(defaults.base_dir, |dir| config_dir.join(dir)),
            source_dir: blocks
                .source_dir
                .as_deref()
                .map_or(defaults.source_dir, |dir| config_dir.join(dir)),
            target: blocks.target.clone().unwrap_or(defaults.target),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(toml: &str, dir: &Path) -> Config {
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(dir);
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));
        assert_eq!(
            config.blocks_resolved,
            BlocksConfig {
                tag: "build".to_owned(),
                base_dir: PathBuf::from("/site/dist"),
                source_dir: PathBuf::from("/site"),
                target: "default".to_owned(),
            }
        );
        assert!(config.aliases.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse("", Path::new("/site"));
        assert_eq!(config.blocks_resolved, BlocksConfig::with_base(Path::new("/site")));
    }

    #[test]
    fn test_resolve_paths() {
        let config = parse(
            r#"
[blocks]
tag = "assets"
base_dir = "public/build"
source_dir = "src"
target = "release"
"#,
            Path::new("/site"),
        );
        assert_eq!(config.blocks_resolved.tag, "assets");
        assert_eq!(config.blocks_resolved.base_dir, PathBuf::from("/site/public/build"));
        assert_eq!(config.blocks_resolved.source_dir, PathBuf::from("/site/src"));
        assert_eq!(config.blocks_resolved.target, "release");
    }

    #[test]
    fn test_parse_aliases() {
        let config = parse(
            r#"
[aliases]
scripts = "js"
styles = "less"
"#,
            Path::new("/site"),
        );
        assert_eq!(config.aliases.get("scripts").map(String::as_str), Some("js"));
        assert_eq!(config.aliases.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_alias_target() {
        let config = parse("[aliases]\nscripts = \"webpack\"\n", Path::new("/site"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("aliases.scripts"));
    }

    #[test]
    fn test_validate_tag() {
        for tag in ["", "my build", "a:b"] {
            let mut config = Config::default_with_base(Path::new("/site"));
            config.blocks_resolved.tag = tag.to_owned();
            assert!(config.validate().is_err(), "tag {tag:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_empty_target() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.blocks_resolved.target = String::new();
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Configuration error: blocks.target cannot be empty"
        );
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));
        config.apply_cli_settings(&CliSettings {
            base_dir: Some(PathBuf::from("/out")),
            target: Some("release".to_owned()),
            ..Default::default()
        });
        assert_eq!(config.blocks_resolved.base_dir, PathBuf::from("/out"));
        assert_eq!(config.blocks_resolved.target, "release");
        assert_eq!(config.blocks_resolved.tag, "build");
        assert_eq!(config.blocks_resolved.source_dir, PathBuf::from("/site"));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("BLOCKMIN_TEST_CFG_OUT", "public");
        }
        let mut config: Config =
            toml::from_str("[blocks]\nbase_dir = \"${BLOCKMIN_TEST_CFG_OUT}/js\"\n").unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/site"));
        assert_eq!(config.blocks_resolved.base_dir, PathBuf::from("/site/public/js"));
        unsafe {
            std::env::remove_var("BLOCKMIN_TEST_CFG_OUT");
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[blocks]\nbase_dir = \"www\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.blocks_resolved.base_dir, dir.path().join("www"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/blockmin.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockmin.toml");
        std::fs::write(&path, "[blocks\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_cli_settings_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blockmin.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            tag: Some("two words".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(Some(&path), Some(&settings)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_discover_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config_from(&nested),
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }
}
