//! Graph Commands

use anyhow::Result;
use serde::Serialize;

use remote_dev_common::{Graph, Mode, Node, Stack};

use crate::output::{print_list, OutputFormat, TableDisplay};

/// Node display wrapper for serialization
#[derive(Serialize)]
pub struct NodeDisplay {
    pub order: usize,
    pub address: String,
    pub kind: &'static str,
    pub taggable: bool,
    pub ignore_changes: Vec<String>,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
}

impl NodeDisplay {
    fn new(order: usize, node: &Node, graph: &Graph) -> Self {
        Self {
            order,
            address: node.address.to_string(),
            kind: match node.address.mode {
                Mode::Managed => "resource",
                Mode::Data => "data",
            },
            taggable: node.taggable,
            ignore_changes: node.lifecycle.ignore_changes.clone(),
            dependencies: node.dependencies.iter().map(|d| d.to_string()).collect(),
            dependents: graph
                .dependents(&node.address)
                .into_iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl TableDisplay for NodeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Address", "Kind", "Tagged", "Ignore Changes", "Depends On", "Used By"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.order.to_string(),
            self.address.clone(),
            self.kind.to_string(),
            self.taggable.to_string(),
            self.ignore_changes.join(", "),
            self.dependencies.join("\n"),
            self.dependents.join("\n"),
        ]
    }
}

fn displays(graph: &Graph) -> Vec<NodeDisplay> {
    graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| NodeDisplay::new(i + 1, node, graph))
        .collect()
}

pub fn execute(stack: &Stack, format: OutputFormat) -> Result<()> {
    stack.graph.validate()?;
    print_list(&displays(&stack.graph), format)
}
