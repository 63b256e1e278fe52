//! IAM role, policy attachments and instance profile

use serde::Serialize;

use super::Resource;
use crate::tags::Tags;
use crate::value::Output;

#[derive(Debug, Clone, Serialize)]
pub struct IamRole {
    pub name: String,
    /// Trust policy document as a JSON string
    pub assume_role_policy: String,
    pub tags: Tags,
}

impl Resource for IamRole {
    fn type_name() -> &'static str {
        "aws_iam_role"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["name"]
    }
}

/// Attaches a managed policy to a role
#[derive(Debug, Clone, Serialize)]
pub struct RolePolicyAttachment {
    pub role: Output,
    pub policy_arn: String,
}

impl Resource for RolePolicyAttachment {
    fn type_name() -> &'static str {
        "aws_iam_role_policy_attachment"
    }

    fn taggable() -> bool {
        false
    }

    fn force_new() -> &'static [&'static str] {
        &["role", "policy_arn"]
    }
}

/// Inline policy embedded in a role
#[derive(Debug, Clone, Serialize)]
pub struct RolePolicy {
    pub name: String,
    pub role: Output,
    /// Permission policy document as a JSON string; may be a template over
    /// deferred values
    pub policy: Output,
}

impl Resource for RolePolicy {
    fn type_name() -> &'static str {
        "aws_iam_role_policy"
    }

    fn taggable() -> bool {
        false
    }

    fn force_new() -> &'static [&'static str] {
        &["name", "role"]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceProfile {
    pub name: String,
    pub role: Output,
    pub tags: Tags,
}

impl Resource for InstanceProfile {
    fn type_name() -> &'static str {
        "aws_iam_instance_profile"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["name"]
    }
}
