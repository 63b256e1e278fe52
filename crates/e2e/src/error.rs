//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("terraform not found in PATH")]
    TerraformNotFound,

    #[error("terraform {command} failed with exit code {code:?}")]
    Terraform { command: String, code: Option<i32> },

    #[error("Stack error: {0}")]
    Stack(#[from] remote_dev_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
