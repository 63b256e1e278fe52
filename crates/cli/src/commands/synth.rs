//! Synthesize Commands

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use remote_dev_common::{render, Stack};

use crate::output::print_success;

#[derive(Args)]
pub struct SynthArgs {
    /// Directory to write main.tf.json into (stdout when omitted)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

/// Managed resources only; data lookups are not written as resources
fn resource_count(stack: &Stack) -> usize {
    stack.graph.nodes().iter().filter(|n| !n.is_data()).count()
}

pub fn execute(args: SynthArgs, stack: &Stack) -> Result<()> {
    match args.out_dir {
        Some(dir) => {
            let path = render::write_to_dir(stack, &dir)?;
            print_success(&format!(
                "Wrote {} resources to {}",
                resource_count(stack),
                path.display()
            ));
        }
        None => {
            let rendered = render::to_string_pretty(stack)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            info!(bytes = rendered.len(), "configuration written to stdout");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_dev_common::StackConfig;

    #[test]
    fn test_resource_count_skips_image_lookup() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        assert_eq!(stack.graph.nodes().len(), 15);
        assert_eq!(resource_count(&stack), 14);
    }

    #[test]
    fn test_writes_into_out_dir() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let args = SynthArgs {
            out_dir: Some(dir.path().to_path_buf()),
        };
        execute(args, &stack).unwrap();
        assert!(dir.path().join("main.tf.json").is_file());
    }
}
