//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;

use std::path::{Path, PathBuf};

use blockmin_config::{CliSettings, Config};
use blockmin_parser::{BlockParser, ParserConfig};
use clap::Args;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

/// Parser options shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct BlockArgs {
    /// Path to configuration file (default: auto-discover blockmin.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directive tag token, as in `<!--TAG:js out.js-->` (overrides config).
    #[arg(long)]
    tag: Option<String>,

    /// Directory bundle destinations are written under (overrides config).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Directory asset references are resolved under (overrides config).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Build target recorded on instructions (overrides config).
    #[arg(long, env = "BLOCKMIN_TARGET")]
    target: Option<String>,
}

impl BlockArgs {
    /// Load configuration and build a parser from it.
    pub(crate) fn parser(&self) -> Result<BlockParser, CliError> {
        let cli_settings = CliSettings {
            tag: self.tag.clone(),
            base_dir: self.base_dir.clone(),
            source_dir: self.source_dir.clone(),
            target: self.target.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let blocks = config.blocks_resolved;

        tracing::debug!(
            config = ?config.config_path,
            tag = %blocks.tag,
            base_dir = %blocks.base_dir.display(),
            source_dir = %blocks.source_dir.display(),
            target = %blocks.target,
            "Loaded configuration"
        );

        let mut parser = BlockParser::new(
            ParserConfig::new()
                .with_tag(blocks.tag)
                .with_base_dir(blocks.base_dir)
                .with_source_dir(blocks.source_dir)
                .with_target(blocks.target),
        )?;

        for (alias, builtin) in &config.aliases {
            parser = parser.with_alias(alias, builtin).ok_or_else(|| {
                CliError::Validation(format!("Alias '{alias}' names unknown handler '{builtin}'"))
            })?;
        }

        Ok(parser)
    }
}

/// Read the input document.
pub(crate) fn read_document(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
