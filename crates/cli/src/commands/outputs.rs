//! Outputs Commands

use anyhow::Result;
use serde::Serialize;

use remote_dev_common::{Stack, StackOutput};

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Serialize)]
pub struct OutputDisplay {
    pub name: String,
    pub value: serde_json::Value,
}

impl From<&StackOutput> for OutputDisplay {
    fn from(output: &StackOutput) -> Self {
        Self {
            name: output.name.clone(),
            value: output.value.to_json(),
        }
    }
}

impl TableDisplay for OutputDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Value"]
    }

    fn row(&self) -> Vec<String> {
        let value = match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        vec![self.name.clone(), value]
    }
}

pub fn execute(stack: &Stack, format: OutputFormat) -> Result<()> {
    let displays: Vec<OutputDisplay> = stack.graph.outputs().iter().map(OutputDisplay::from).collect();
    print_list(&displays, format)
}
