//! Network and security group declarations

use serde::Serialize;

use super::Resource;
use crate::tags::Tags;
use crate::value::Output;

/// CIDR matching every IPv4 destination
pub const ANY_IPV4: &str = "0.0.0.0/0";

#[derive(Debug, Clone, Serialize)]
pub struct Vpc {
    pub cidr_block: String,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
    pub tags: Tags,
}

impl Resource for Vpc {
    fn type_name() -> &'static str {
        "aws_vpc"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["cidr_block"]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InternetGateway {
    pub vpc_id: Output,
    pub tags: Tags,
}

impl Resource for InternetGateway {
    fn type_name() -> &'static str {
        "aws_internet_gateway"
    }

    fn taggable() -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Subnet {
    pub vpc_id: Output,
    pub cidr_block: String,
    pub map_public_ip_on_launch: bool,
    pub tags: Tags,
}

impl Resource for Subnet {
    fn type_name() -> &'static str {
        "aws_subnet"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["vpc_id", "cidr_block"]
    }
}

/// Inline route. Terraform JSON reads `route` as a list of objects, so every
/// target attribute must be present; unused ones render as `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Route {
    pub cidr_block: String,
    pub gateway_id: Option<Output>,
    pub carrier_gateway_id: Option<Output>,
    pub core_network_arn: Option<Output>,
    pub destination_prefix_list_id: Option<Output>,
    pub egress_only_gateway_id: Option<Output>,
    pub ipv6_cidr_block: Option<String>,
    pub local_gateway_id: Option<Output>,
    pub nat_gateway_id: Option<Output>,
    pub network_interface_id: Option<Output>,
    pub transit_gateway_id: Option<Output>,
    pub vpc_endpoint_id: Option<Output>,
    pub vpc_peering_connection_id: Option<Output>,
}

impl Route {
    /// Route sending a destination to an internet gateway
    pub fn via_gateway(cidr_block: &str, gateway_id: Output) -> Self {
        Self {
            cidr_block: cidr_block.to_string(),
            gateway_id: Some(gateway_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteTable {
    pub vpc_id: Output,
    pub route: Vec<Route>,
    pub tags: Tags,
}

impl RouteTable {
    /// Route table whose only route sends all traffic to a gateway
    pub fn default_route(vpc_id: Output, gateway_id: Output, tags: Tags) -> Self {
        Self {
            vpc_id,
            route: vec![Route::via_gateway(ANY_IPV4, gateway_id)],
            tags,
        }
    }
}

impl Resource for RouteTable {
    fn type_name() -> &'static str {
        "aws_route_table"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["vpc_id"]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteTableAssociation {
    pub subnet_id: Output,
    pub route_table_id: Output,
}

impl Resource for RouteTableAssociation {
    fn type_name() -> &'static str {
        "aws_route_table_association"
    }

    fn taggable() -> bool {
        false
    }

    fn force_new() -> &'static [&'static str] {
        &["subnet_id"]
    }
}

/// Inline security group rule. Like routes, every attribute must be present
/// in Terraform JSON; unused ones render as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityGroupRule {
    /// `-1` means every protocol
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<String>,
    pub description: Option<String>,
    pub ipv6_cidr_blocks: Option<Vec<String>>,
    pub prefix_list_ids: Option<Vec<String>>,
    pub security_groups: Option<Vec<String>>,
    #[serde(rename = "self")]
    pub self_referencing: Option<bool>,
}

impl SecurityGroupRule {
    /// Every protocol and port to or from anywhere
    pub fn allow_all() -> Self {
        Self {
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            cidr_blocks: vec![ANY_IPV4.to_string()],
            description: None,
            ipv6_cidr_blocks: None,
            prefix_list_ids: None,
            security_groups: None,
            self_referencing: None,
        }
    }
}

/// Security group. Rule lists are authoritative: an empty `ingress` removes
/// any inbound rule added out of band.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroup {
    pub vpc_id: Output,
    pub description: String,
    pub ingress: Vec<SecurityGroupRule>,
    pub egress: Vec<SecurityGroupRule>,
    pub tags: Tags,
}

impl Resource for SecurityGroup {
    fn type_name() -> &'static str {
        "aws_security_group"
    }

    fn taggable() -> bool {
        true
    }

    fn force_new() -> &'static [&'static str] {
        &["vpc_id", "description", "name"]
    }
}
