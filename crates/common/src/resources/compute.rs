//! Machine image lookup and the EC2 instance

use serde::Serialize;

use super::{DataSource, Resource};
use crate::tags::Tags;
use crate::value::Output;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmiFilter {
    pub name: String,
    pub values: Vec<String>,
}

impl AmiFilter {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            values: vec![value.to_string()],
        }
    }
}

/// Most recent image matching an owner and a set of filters. Re-evaluated on
/// every plan, so the result moves when a newer image is published.
#[derive(Debug, Clone, Serialize)]
pub struct AmiLookup {
    pub owners: Vec<String>,
    pub most_recent: bool,
    pub filter: Vec<AmiFilter>,
}

impl DataSource for AmiLookup {
    fn type_name() -> &'static str {
        "aws_ami"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RootBlockDevice {
    /// Size in GB
    pub volume_size: serde_json::Number,
    pub volume_type: String,
    pub encrypted: bool,
    pub delete_on_termination: bool,
    pub tags: Tags,
}

#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    pub ami: Output,
    pub instance_type: String,
    pub subnet_id: Output,
    pub vpc_security_group_ids: Vec<Output>,
    pub iam_instance_profile: Output,
    pub root_block_device: RootBlockDevice,
    pub tags: Tags,
}

impl Resource for Instance {
    fn type_name() -> &'static str {
        "aws_instance"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["ami", "subnet_id", "availability_zone"]
    }
}
