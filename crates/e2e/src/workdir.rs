//! Scratch Terraform working directory

use std::path::{Path, PathBuf};
use std::process::Command;

use remote_dev_common::{render, Stack, StackConfig};
use tempfile::TempDir;
use tracing::info;

use crate::error::{E2eError, E2eResult};

/// Whether a binary can be found through the login shell's PATH
pub fn in_path(bin: &str) -> bool {
    Command::new("sh")
        .arg("-lc")
        .arg(format!("command -v {bin} >/dev/null 2>&1"))
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Temporary directory holding a synthesized `main.tf.json`. Removed on drop.
pub struct TerraformWorkdir {
    dir: TempDir,
    main_file: PathBuf,
}

impl TerraformWorkdir {
    /// Declare the stack for a configuration and write it out
    pub fn synthesize(config: &StackConfig) -> E2eResult<Self> {
        let stack = Stack::declare(config)?;
        let dir = tempfile::tempdir()?;
        let main_file = render::write_to_dir(&stack, dir.path())?;
        Ok(Self { dir, main_file })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn main_file(&self) -> &Path {
        &self.main_file
    }

    /// Parse the written configuration back
    pub fn document(&self) -> E2eResult<serde_json::Value> {
        let content = std::fs::read_to_string(&self.main_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Run a terraform subcommand inside the working directory
    pub fn terraform(&self, args: &[&str]) -> E2eResult<()> {
        if !in_path("terraform") {
            return Err(E2eError::TerraformNotFound);
        }
        info!(?args, dir = %self.path().display(), "running terraform");
        let status = Command::new("terraform")
            .args(args)
            .current_dir(self.path())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(E2eError::Terraform {
                command: args.join(" "),
                code: status.code(),
            })
        }
    }
}
