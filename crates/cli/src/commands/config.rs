//! Config Commands

use anyhow::Result;
use serde::Serialize;

use remote_dev_common::StackConfig;

use crate::output::{print_item, OutputFormat, TableDisplay};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDisplay {
    pub instance_type: String,
    pub volume_size: serde_json::Number,
    pub region: Option<String>,
}

impl From<&StackConfig> for ConfigDisplay {
    fn from(config: &StackConfig) -> Self {
        Self {
            instance_type: config.instance_type.clone(),
            volume_size: config.volume_size.clone(),
            region: config.region.clone(),
        }
    }
}

impl TableDisplay for ConfigDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["instanceType", "volumeSize (GB)", "region"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.instance_type.clone(),
            self.volume_size.to_string(),
            self.region.clone().unwrap_or_else(|| "(engine default)".to_string()),
        ]
    }
}

pub fn execute(config: &StackConfig, format: OutputFormat) -> Result<()> {
    print_item(&ConfigDisplay::from(config), format)
}
