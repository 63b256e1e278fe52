//! Remote Dev E2E Test Support
//!
//! Synthesizes the stack into a scratch Terraform working directory and drives
//! the `terraform` binary against it when one is installed.

pub mod error;
pub mod workdir;

pub use error::{E2eError, E2eResult};
pub use workdir::{in_path, TerraformWorkdir};
