//! Stack configuration
//!
//! Two settings shape the environment: the instance type and the root volume
//! size. Values are layered: defaults, then the TOML stack file, then the
//! environment, then explicit `key=value` overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::debug;

use crate::error::{Error, Result};

/// Mid-size Graviton instance used when `instanceType` is not set.
pub const DEFAULT_INSTANCE_TYPE: &str = "m8g.xlarge";

/// Root volume size in GB used when `volumeSize` is not set.
pub const DEFAULT_VOLUME_SIZE: u32 = 100;

pub const ENV_INSTANCE_TYPE: &str = "REMOTE_DEV_INSTANCE_TYPE";
pub const ENV_VOLUME_SIZE: &str = "REMOTE_DEV_VOLUME_SIZE";
pub const ENV_REGION: &str = "REMOTE_DEV_REGION";

/// Resolved stack configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// EC2 instance type for the machine
    pub instance_type: String,

    /// Root volume size in GB. Any number is accepted; the engine decides
    /// whether the provider takes it.
    pub volume_size: Number,

    /// Provider region; the engine's environment decides when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            volume_size: Number::from(DEFAULT_VOLUME_SIZE),
            region: None,
        }
    }
}

/// Optional values as they appear in a stack file. Absent keys keep
/// whatever the lower layer resolved.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StackFile {
    instance_type: Option<String>,
    volume_size: Option<Number>,
    region: Option<String>,
}

impl StackConfig {
    /// Load configuration from a stack file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            config.merge_file(&content)?;
            debug!(path = %path.display(), "loaded stack file");
        }
        Ok(config)
    }

    /// Parse a stack file from a string on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(content)?;
        Ok(config)
    }

    fn merge_file(&mut self, content: &str) -> Result<()> {
        let file: StackFile = toml::from_str(content)?;
        if let Some(instance_type) = file.instance_type {
            self.instance_type = instance_type;
        }
        if let Some(volume_size) = file.volume_size {
            self.volume_size = volume_size;
        }
        if file.region.is_some() {
            self.region = file.region;
        }
        Ok(())
    }

    /// Apply values from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply values from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_INSTANCE_TYPE) {
            self.set("instanceType", &value)?;
        }
        if let Some(value) = lookup(ENV_VOLUME_SIZE) {
            self.set("volumeSize", &value)?;
        }
        if let Some(value) = lookup(ENV_REGION) {
            self.set("region", &value)?;
        }
        Ok(())
    }

    /// Set a single key. Only the value's type is checked; the provisioning
    /// engine decides whether an instance type or size is acceptable.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "instanceType" => self.instance_type = value.to_string(),
            "volumeSize" => {
                self.volume_size = value.trim().parse().map_err(|_| {
                    Error::InvalidConfig(format!(
                        "volumeSize must be a number, got {:?}",
                        value
                    ))
                })?;
            }
            "region" => self.region = Some(value.to_string()),
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unknown configuration key {:?} (expected instanceType, volumeSize or region)",
                    other
                )))
            }
        }
        debug!(key, value, "configuration override");
        Ok(())
    }

    /// Apply a `key=value` override as given on the command line
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidConfig(format!("expected key=value, got {:?}", assignment))
        })?;
        self.set(key.trim(), value)
    }
}
