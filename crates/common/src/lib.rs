//! Remote Dev Common Library
//!
//! Declares the remote development environment as a typed resource graph and
//! renders it for the provisioning engine.

pub mod config;
pub mod error;
pub mod graph;
pub mod plan;
pub mod policy;
pub mod render;
pub mod resources;
pub mod stack;
pub mod tags;
pub mod value;

// Re-export commonly used types
pub use config::StackConfig;
pub use error::{Error, Result};
pub use graph::{Graph, Handle, Lifecycle, Node, StackOutput};
pub use stack::Stack;
pub use tags::Tags;
pub use value::{Address, AttrRef, Mode, Output};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default stack file, looked up in the working directory
pub const DEFAULT_STACK_FILE: &str = "remote-dev.toml";
