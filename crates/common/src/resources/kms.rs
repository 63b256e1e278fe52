//! KMS key for sops secrets

use serde::Serialize;

use super::Resource;
use crate::tags::Tags;
use crate::value::Output;

#[derive(Debug, Clone, Serialize)]
pub struct KmsKey {
    pub description: String,
    pub tags: Tags,
}

impl Resource for KmsKey {
    fn type_name() -> &'static str {
        "aws_kms_key"
    }

    fn taggable() -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KmsAlias {
    /// Must start with `alias/`
    pub name: String,
    pub target_key_id: Output,
}

impl Resource for KmsAlias {
    fn type_name() -> &'static str {
        "aws_kms_alias"
    }

    fn taggable() -> bool {
        false
    }

    fn force_new() -> &'static [&'static str] {
        &["name"]
    }
}
