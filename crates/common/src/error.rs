//! Error types for the remote dev stack

use thiserror::Error;

/// Result type alias using the stack Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or building the declaration graph.
///
/// Provider-side failures (quotas, naming conflicts, invalid CIDRs) are not
/// represented here; they surface from the provisioning engine at apply time.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stack file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Duplicate declaration: {address}")]
    DuplicateAddress { address: String },

    #[error("{from} references {target}, which is not declared before it")]
    UnresolvedReference { from: String, target: String },
}
