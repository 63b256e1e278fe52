//! Declaration graph
//!
//! Nodes are appended in declaration order. A node may only reference nodes
//! declared before it, so declaration order is always a valid creation order
//! and the graph is acyclic by construction. The engine derives the same
//! edges from the rendered interpolations and schedules independent branches
//! in parallel.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resources::{DataSource, Resource};
use crate::value::{collect_references, Address, AttrRef, Mode, Output};

/// Meta-arguments controlling how the engine reacts to drift
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lifecycle {
    /// Attributes whose drift never triggers an update or replacement
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
}

impl Lifecycle {
    pub fn ignore_changes(attributes: &[&str]) -> Self {
        Self {
            ignore_changes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ignore_changes.is_empty()
    }

    pub fn ignores(&self, attribute: &str) -> bool {
        self.ignore_changes.iter().any(|a| a == attribute)
    }
}

/// A declared resource or data-source lookup
#[derive(Debug, Clone)]
pub struct Node {
    pub address: Address,
    /// Rendered attribute map
    pub attributes: serde_json::Value,
    pub taggable: bool,
    pub force_new: &'static [&'static str],
    pub lifecycle: Lifecycle,
    /// Directly referenced nodes, in first-seen order
    pub dependencies: Vec<Address>,
}

impl Node {
    pub fn is_data(&self) -> bool {
        self.address.mode == Mode::Data
    }
}

/// Returned from a declaration; hands out deferred attributes of the node
#[derive(Debug, Clone)]
pub struct Handle {
    address: Address,
}

impl Handle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn attr(&self, attribute: &str) -> Output {
        Output::Deferred(self.address.attr(attribute))
    }

    pub fn id(&self) -> Output {
        self.attr("id")
    }

    pub fn arn(&self) -> Output {
        self.attr("arn")
    }

    pub fn name(&self) -> Output {
        self.attr("name")
    }
}

/// Named value exposed after a successful apply
#[derive(Debug, Clone)]
pub struct StackOutput {
    pub name: String,
    pub value: Output,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    outputs: Vec<StackOutput>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a managed resource
    pub fn resource<R: Resource>(&mut self, name: &str, resource: &R) -> Result<Handle> {
        self.resource_with(name, resource, Lifecycle::default())
    }

    /// Declare a managed resource with lifecycle meta-arguments
    pub fn resource_with<R: Resource>(
        &mut self,
        name: &str,
        resource: &R,
        lifecycle: Lifecycle,
    ) -> Result<Handle> {
        let address = Address::managed(R::type_name(), name);
        let attributes = serde_json::to_value(resource)?;
        self.insert(address, attributes, R::taggable(), R::force_new(), lifecycle)
    }

    /// Declare a data-source lookup
    pub fn data<D: DataSource>(&mut self, name: &str, lookup: &D) -> Result<Handle> {
        let address = Address::data(D::type_name(), name);
        let attributes = serde_json::to_value(lookup)?;
        self.insert(address, attributes, false, &[], Lifecycle::default())
    }

    fn insert(
        &mut self,
        address: Address,
        attributes: serde_json::Value,
        taggable: bool,
        force_new: &'static [&'static str],
        lifecycle: Lifecycle,
    ) -> Result<Handle> {
        if self.get(&address).is_some() {
            return Err(Error::DuplicateAddress {
                address: address.to_string(),
            });
        }

        let mut refs = Vec::new();
        collect_references(&attributes, &mut refs);
        let dependencies = self.resolve(&address.to_string(), &refs)?;

        debug!(%address, dependencies = dependencies.len(), "declared");

        self.nodes.push(Node {
            address: address.clone(),
            attributes,
            taggable,
            force_new,
            lifecycle,
            dependencies,
        });

        Ok(Handle { address })
    }

    /// Map references to the addresses they point at, rejecting any that are
    /// not declared yet
    fn resolve(&self, from: &str, refs: &[AttrRef]) -> Result<Vec<Address>> {
        let mut addresses: Vec<Address> = Vec::new();
        for r in refs {
            if self.get(&r.address).is_none() {
                return Err(Error::UnresolvedReference {
                    from: from.to_string(),
                    target: r.expression(),
                });
            }
            if !addresses.contains(&r.address) {
                addresses.push(r.address.clone());
            }
        }
        Ok(addresses)
    }

    /// Expose a value after apply
    pub fn output(&mut self, name: &str, value: impl Into<Output>) -> Result<()> {
        if self.outputs.iter().any(|o| o.name == name) {
            return Err(Error::DuplicateAddress {
                address: format!("output.{}", name),
            });
        }
        let value = value.into();
        self.resolve(&format!("output.{}", name), &value.refs())?;
        self.outputs.push(StackOutput {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn get(&self, address: &Address) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.address == address)
    }

    /// Position of a node in declaration order
    pub fn position(&self, address: &Address) -> Option<usize> {
        self.nodes.iter().position(|n| &n.address == address)
    }

    pub fn dependencies(&self, address: &Address) -> Option<&[Address]> {
        self.get(address).map(|n| n.dependencies.as_slice())
    }

    /// Nodes that directly reference the given address
    pub fn dependents(&self, address: &Address) -> Vec<&Address> {
        self.nodes
            .iter()
            .filter(|n| n.dependencies.contains(address))
            .map(|n| &n.address)
            .collect()
    }

    /// Check that every reference points at a node declared earlier
    pub fn validate(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            for dep in &node.dependencies {
                match self.position(dep) {
                    Some(p) if p < index => {}
                    _ => {
                        return Err(Error::UnresolvedReference {
                            from: node.address.to_string(),
                            target: dep.to_string(),
                        })
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{InternetGateway, Vpc};
    use crate::tags::Tags;

    fn vpc() -> Vpc {
        Vpc {
            cidr_block: "10.0.0.0/16".to_string(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            tags: Tags::defaults(),
        }
    }

    #[test]
    fn test_dependencies_follow_references() {
        let mut graph = Graph::new();
        let vpc = graph.resource("vpc", &vpc()).unwrap();
        let igw = graph
            .resource(
                "igw",
                &InternetGateway {
                    vpc_id: vpc.id(),
                    tags: Tags::defaults(),
                },
            )
            .unwrap();

        assert_eq!(graph.dependencies(igw.address()).unwrap(), &[vpc.address().clone()]);
        assert_eq!(graph.dependents(vpc.address()), vec![igw.address()]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut graph = Graph::new();
        graph.resource("vpc", &vpc()).unwrap();
        let err = graph.resource("vpc", &vpc()).unwrap_err();
        assert!(matches!(err, Error::DuplicateAddress { address } if address == "aws_vpc.vpc"));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let mut graph = Graph::new();
        let dangling = Address::managed("aws_vpc", "later").attr("id");
        let err = graph
            .resource(
                "igw",
                &InternetGateway {
                    vpc_id: dangling.into(),
                    tags: Tags::defaults(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedReference { target, .. } if target == "aws_vpc.later.id"));
        assert!(graph.nodes().is_empty());
    }

    #[test]
    fn test_outputs_must_reference_declared_nodes() {
        let mut graph = Graph::new();
        let vpc = graph.resource("vpc", &vpc()).unwrap();
        graph.output("vpcId", vpc.id()).unwrap();
        assert!(graph.output("vpcId", vpc.id()).is_err());
        assert!(graph
            .output("other", Address::managed("aws_vpc", "other").attr("id"))
            .is_err());
        assert_eq!(graph.outputs().len(), 1);
    }

    #[test]
    fn test_lifecycle_ignores() {
        let lifecycle = Lifecycle::ignore_changes(&["ami"]);
        assert!(lifecycle.ignores("ami"));
        assert!(!lifecycle.ignores("instance_type"));
        assert!(Lifecycle::default().is_empty());
    }
}
