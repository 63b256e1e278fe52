//! Terraform JSON rendering
//!
//! Turns a declared stack into a `main.tf.json` document for the engine.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::Result;
use crate::stack::Stack;
use crate::value::Mode;

/// File name the engine picks up from a working directory
pub const MAIN_FILE: &str = "main.tf.json";

pub const AWS_PROVIDER_SOURCE: &str = "hashicorp/aws";
pub const AWS_PROVIDER_VERSION: &str = ">= 5.0";

/// Render the stack as a Terraform JSON configuration document
pub fn terraform_json(stack: &Stack) -> Value {
    let mut resources: Map<String, Value> = Map::new();
    let mut data: Map<String, Value> = Map::new();

    for node in stack.graph.nodes() {
        let mut body = match &node.attributes {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if !node.lifecycle.is_empty() {
            body.insert("lifecycle".to_string(), json!(node.lifecycle));
        }

        let section = match node.address.mode {
            Mode::Managed => &mut resources,
            Mode::Data => &mut data,
        };
        let by_type = section
            .entry(node.address.type_name.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(by_type) = by_type {
            by_type.insert(node.address.name.clone(), Value::Object(body));
        }
    }

    let outputs: Map<String, Value> = stack
        .graph
        .outputs()
        .iter()
        .map(|o| (o.name.clone(), json!({ "value": o.value })))
        .collect();

    let mut aws = Map::new();
    if let Some(region) = &stack.config.region {
        aws.insert("region".to_string(), json!(region));
    }

    json!({
        "terraform": {
            "required_providers": {
                "aws": {
                    "source": AWS_PROVIDER_SOURCE,
                    "version": AWS_PROVIDER_VERSION,
                }
            }
        },
        "provider": { "aws": aws },
        "data": data,
        "resource": resources,
        "output": outputs,
    })
}

pub fn to_string_pretty(stack: &Stack) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(&terraform_json(stack))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write `main.tf.json` into a working directory, creating it if needed
pub fn write_to_dir(stack: &Stack, dir: &Path) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(MAIN_FILE);
    std::fs::write(&path, to_string_pretty(stack)?)?;
    info!(path = %path.display(), "wrote configuration");
    Ok(path)
}
