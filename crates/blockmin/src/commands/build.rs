//! `blockmin build` command implementation.

use std::io::Write;
use std::path::PathBuf;

use blockmin_parser::{BuildInstruction, ParseOutput};
use clap::Args;

use super::{BlockArgs, read_document};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// HTML document to process.
    input: PathBuf,

    /// Where to write the rewritten document (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write build instructions as JSON.
    #[arg(short, long)]
    instructions: Option<PathBuf>,

    #[command(flatten)]
    blocks: BlockArgs,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let parser = self.blocks.parser()?;
        let document = read_document(&self.input)?;
        let result = parser.parse(&document)?;

        output.warnings(result.warnings());

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.document)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(result.document.as_bytes())?;
                stdout.flush()?;
            }
        }

        let count = result.instructions().count();
        if let Some(path) = &self.instructions {
            std::fs::write(path, instructions_json(&result)?)?;
            output.success(&format!(
                "Wrote {count} build instruction(s) to {}",
                path.display()
            ));
        } else if count > 0 {
            output.info(&format!(
                "{count} build instruction(s) not written (use --instructions)"
            ));
        }

        Ok(())
    }
}

/// Serialize the instructions of `result` as a pretty JSON array.
fn instructions_json(result: &ParseOutput) -> Result<String, serde_json::Error> {
    let instructions: Vec<&BuildInstruction> = result.instructions().collect();
    serde_json::to_string_pretty(&instructions)
}
