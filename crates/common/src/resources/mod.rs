//! Resource Declarations
//!
//! Typed attribute records for each provider resource the stack declares.
//! Field names are the provider's attribute names; serde turns a record into
//! the attribute map the engine consumes.

pub mod compute;
pub mod identity;
pub mod kms;
pub mod network;

use serde::Serialize;

pub use compute::{AmiFilter, AmiLookup, Instance, RootBlockDevice};
pub use identity::{IamRole, InstanceProfile, RolePolicy, RolePolicyAttachment};
pub use kms::{KmsAlias, KmsKey};
pub use network::{
    InternetGateway, Route, RouteTable, RouteTableAssociation, SecurityGroup, SecurityGroupRule,
    Subnet, Vpc,
};

/// A managed resource type
pub trait Resource: Serialize {
    /// Resource type name
    fn type_name() -> &'static str;

    /// Whether the type accepts a `tags` map
    fn taggable() -> bool;

    /// Attributes that can only change by replacing the resource
    fn force_new() -> &'static [&'static str] {
        &[]
    }
}

/// A lookup resolved by the engine on every plan; never created or owned
pub trait DataSource: Serialize {
    /// Data source type name
    fn type_name() -> &'static str;
}
