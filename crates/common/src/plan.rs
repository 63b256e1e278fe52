//! Drift plan
//!
//! Predicts how the engine will treat a declared resource given its prior
//! realized attributes. Deferred values are substituted through a resolver;
//! a value the resolver cannot provide is "known after apply" and always
//! counts as a change.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::graph::{Graph, Node};
use crate::value::{scan_references, Address, AttrRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    NoOp,
    Create,
    Update,
    Replace,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::NoOp => write!(f, "no-op"),
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Replace => write!(f, "replace"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub attribute: String,
    pub before: Option<Value>,
    /// `None` when the value is only known after apply
    pub after: Option<Value>,
    pub forces_replacement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceChange {
    pub address: Address,
    pub action: Action,
    pub changes: Vec<AttributeChange>,
}

/// Compare one declared resource against its prior attributes
pub fn diff<F>(node: &Node, prior: &Map<String, Value>, resolve: F) -> ResourceChange
where
    F: Fn(&AttrRef) -> Option<Value>,
{
    let mut changes = Vec::new();

    if let Value::Object(declared) = &node.attributes {
        for (attribute, value) in declared {
            if node.lifecycle.ignores(attribute) {
                continue;
            }
            let after = substitute(value, &resolve);
            let before = prior.get(attribute).cloned();
            if after.is_some() && after == before {
                continue;
            }
            changes.push(AttributeChange {
                attribute: attribute.clone(),
                before,
                after,
                forces_replacement: node.force_new.contains(&attribute.as_str()),
            });
        }
    }

    let action = if changes.is_empty() {
        Action::NoOp
    } else if changes.iter().any(|c| c.forces_replacement) {
        Action::Replace
    } else {
        Action::Update
    };

    ResourceChange {
        address: node.address.clone(),
        action,
        changes,
    }
}

/// Plan every managed resource. Resources without prior attributes are
/// created; data sources are skipped since the engine re-reads them anyway.
pub fn plan<F>(
    graph: &Graph,
    prior: &HashMap<Address, Map<String, Value>>,
    resolve: F,
) -> Vec<ResourceChange>
where
    F: Fn(&AttrRef) -> Option<Value>,
{
    graph
        .nodes()
        .iter()
        .filter(|n| !n.is_data())
        .map(|node| match prior.get(&node.address) {
            Some(attrs) => diff(node, attrs, &resolve),
            None => ResourceChange {
                address: node.address.clone(),
                action: Action::Create,
                changes: Vec::new(),
            },
        })
        .collect()
}

/// Replace interpolations with resolved values. A string that is exactly one
/// interpolation takes the resolved value's own type.
fn substitute<F>(value: &Value, resolve: &F) -> Option<Value>
where
    F: Fn(&AttrRef) -> Option<Value>,
{
    match value {
        Value::String(s) => {
            let refs = scan_references(s);
            if refs.is_empty() {
                return Some(value.clone());
            }
            if refs.len() == 1 && s.as_str() == refs[0].interpolation() {
                return resolve(&refs[0]);
            }
            let mut out = s.clone();
            for r in refs {
                let resolved = match resolve(&r)? {
                    Value::String(v) => v,
                    other => other.to_string(),
                };
                out = out.replace(&r.interpolation(), &resolved);
            }
            Some(Value::String(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, resolve))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| substitute(v, resolve).map(|v| (k.clone(), v)))
            .collect::<Option<Map<_, _>>>()
            .map(Value::Object),
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackConfig;
    use crate::stack::Stack;
    use serde_json::json;

    fn machine_address() -> Address {
        Address::managed("aws_instance", "machine")
    }

    /// Resolver standing in for the engine: every id is `<name>-id`, the
    /// image lookup yields `ami`, the profile name is fixed.
    fn resolver(ami: &'static str) -> impl Fn(&AttrRef) -> Option<Value> {
        move |r: &AttrRef| match (r.address.name.as_str(), r.attribute.as_str()) {
            ("nixos", "id") => Some(json!(ami)),
            ("instance_profile", "name") => Some(json!("profile")),
            (name, "id") => Some(json!(format!("{}-id", name))),
            _ => None,
        }
    }

    /// Prior state matching what the stack declares with `ami-old`
    fn prior_machine(stack: &Stack, ami: &'static str) -> Map<String, Value> {
        let node = stack.graph.get(&machine_address()).unwrap();
        match substitute(&node.attributes, &resolver(ami)) {
            Some(Value::Object(map)) => map,
            other => panic!("unexpected prior state: {:?}", other),
        }
    }

    #[test]
    fn test_newer_image_does_not_replace_instance() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let prior = prior_machine(&stack, "ami-old");
        let node = stack.graph.get(&machine_address()).unwrap();

        let change = diff(node, &prior, resolver("ami-new"));
        assert_eq!(change.action, Action::NoOp);
        assert!(change.changes.is_empty());
    }

    #[test]
    fn test_newer_image_would_replace_without_pin() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let prior = prior_machine(&stack, "ami-old");
        let mut node = stack.graph.get(&machine_address()).unwrap().clone();
        node.lifecycle.ignore_changes.clear();

        let change = diff(&node, &prior, resolver("ami-new"));
        assert_eq!(change.action, Action::Replace);
        assert_eq!(change.changes.len(), 1);
        assert_eq!(change.changes[0].attribute, "ami");
        assert_eq!(change.changes[0].before, Some(json!("ami-old")));
        assert_eq!(change.changes[0].after, Some(json!("ami-new")));
    }

    #[test]
    fn test_instance_type_change_updates_in_place() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let prior = prior_machine(&stack, "ami-old");

        let mut config = StackConfig::default();
        config.apply_override("instanceType=m8g.2xlarge").unwrap();
        let resized = Stack::declare(&config).unwrap();
        let node = resized.graph.get(&machine_address()).unwrap();

        let change = diff(node, &prior, resolver("ami-new"));
        assert_eq!(change.action, Action::Update);
        assert_eq!(change.changes[0].attribute, "instance_type");
        assert!(!change.changes[0].forces_replacement);
    }

    #[test]
    fn test_unknown_values_count_as_changes() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let prior = prior_machine(&stack, "ami-old");
        let node = stack.graph.get(&machine_address()).unwrap();

        let change = diff(node, &prior, |_| None);
        let subnet = change
            .changes
            .iter()
            .find(|c| c.attribute == "subnet_id")
            .unwrap();
        assert!(subnet.after.is_none());
        assert_eq!(change.action, Action::Replace);
    }

    #[test]
    fn test_empty_prior_creates_everything() {
        let stack = Stack::declare(&StackConfig::default()).unwrap();
        let changes = plan(&stack.graph, &HashMap::new(), resolver("ami-new"));
        assert_eq!(changes.len(), 14);
        assert!(changes.iter().all(|c| c.action == Action::Create));
    }

    #[test]
    fn test_template_substitution() {
        let value = json!("{\"Resource\":\"${aws_kms_key.sops_key.arn}\"}");
        let resolved = substitute(&value, &|_: &AttrRef| Some(json!("arn:aws:kms:x"))).unwrap();
        assert_eq!(resolved, json!("{\"Resource\":\"arn:aws:kms:x\"}"));
    }
}
