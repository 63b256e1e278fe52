//! Resource tags

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag that keeps the team's cleanup automation away from a resource
pub const PROTECT_TAG: &str = "do-not-nuke";

/// Tag map attached to a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Tags every taggable resource in the stack carries
    pub fn defaults() -> Self {
        let mut tags = Self::default();
        tags.0.insert(PROTECT_TAG.to_string(), "true".to_string());
        tags
    }

    /// Defaults plus a `Name` tag, which the AWS console displays
    pub fn named(name: impl Into<String>) -> Self {
        Self::defaults().with("Name", name)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}
