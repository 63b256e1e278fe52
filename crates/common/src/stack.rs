//! The remote dev stack
//!
//! One ARM machine in its own VPC with no inbound access. Operators reach it
//! through SSM Session Manager; the instance role can invoke Bedrock models
//! and decrypt sops secrets with a dedicated KMS key.

use tracing::info;

use crate::config::StackConfig;
use crate::error::Result;
use crate::graph::{Graph, Lifecycle};
use crate::policy;
use crate::resources::{
    AmiFilter, AmiLookup, IamRole, Instance, InstanceProfile, InternetGateway, KmsAlias, KmsKey,
    RolePolicy, RolePolicyAttachment, RootBlockDevice, RouteTable, RouteTableAssociation,
    SecurityGroup, SecurityGroupRule, Subnet, Vpc,
};
use crate::tags::Tags;

/// Prefix of every physical name and `Name` tag
pub const NAME_PREFIX: &str = "dagafonov-remote-dev";

pub const VPC_CIDR: &str = "10.0.0.0/16";
pub const SUBNET_CIDR: &str = "10.0.1.0/24";

/// Publisher of the official NixOS images
pub const NIXOS_AMI_OWNER: &str = "427812963091";
pub const NIXOS_AMI_ARCH: &str = "arm64";
pub const NIXOS_AMI_NAME: &str = "nixos/25.11.*-aarch64-linux";

pub const SSM_MANAGED_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonSSMManagedInstanceCore";

/// `Team` and `Explanation` are required by the organization's SCP for
/// instance types above the small tier.
pub const TEAM_TAG: &str = "rd-team-espeon";
pub const EXPLANATION_TAG: &str = "Personal remote dev environment for Danil Agafonov";

/// Output names
pub const OUTPUT_INSTANCE_ID: &str = "instanceId";
pub const OUTPUT_PUBLIC_IP: &str = "publicIp";
pub const OUTPUT_AMI_ID: &str = "amiId";
pub const OUTPUT_SOPS_KEY_ARN: &str = "sopsKeyArn";

fn physical(suffix: &str) -> String {
    format!("{}-{}", NAME_PREFIX, suffix)
}

/// Resolved configuration plus the declaration graph built from it
#[derive(Debug, Clone)]
pub struct Stack {
    pub config: StackConfig,
    pub graph: Graph,
}

impl Stack {
    /// Declare every resource of the environment for a configuration
    pub fn declare(config: &StackConfig) -> Result<Self> {
        let mut graph = Graph::new();

        // Network
        let vpc = graph.resource(
            "vpc",
            &Vpc {
                cidr_block: VPC_CIDR.to_string(),
                enable_dns_support: true,
                enable_dns_hostnames: true,
                tags: Tags::named(physical("vpc")),
            },
        )?;

        let igw = graph.resource(
            "igw",
            &InternetGateway {
                vpc_id: vpc.id(),
                tags: Tags::named(physical("igw")),
            },
        )?;

        let subnet = graph.resource(
            "subnet",
            &Subnet {
                vpc_id: vpc.id(),
                cidr_block: SUBNET_CIDR.to_string(),
                map_public_ip_on_launch: true,
                tags: Tags::named(physical("subnet")),
            },
        )?;

        let route_table = graph.resource(
            "rt",
            &RouteTable::default_route(vpc.id(), igw.id(), Tags::named(physical("rt"))),
        )?;

        graph.resource(
            "rta",
            &RouteTableAssociation {
                subnet_id: subnet.id(),
                route_table_id: route_table.id(),
            },
        )?;

        let sg = graph.resource(
            "sg",
            &SecurityGroup {
                vpc_id: vpc.id(),
                description: "Remote dev - no inbound, all outbound".to_string(),
                ingress: Vec::new(),
                egress: vec![SecurityGroupRule::allow_all()],
                tags: Tags::named(physical("sg")),
            },
        )?;

        // Identity
        let role = graph.resource(
            "role",
            &IamRole {
                name: physical("role"),
                assume_role_policy: policy::assume_role_policy("ec2.amazonaws.com").to_json()?,
                tags: Tags::defaults(),
            },
        )?;

        graph.resource(
            "ssm_policy",
            &RolePolicyAttachment {
                role: role.name(),
                policy_arn: SSM_MANAGED_POLICY_ARN.to_string(),
            },
        )?;

        graph.resource(
            "bedrock_policy",
            &RolePolicy {
                name: physical("bedrock-policy"),
                role: role.name(),
                policy: policy::bedrock_invoke_policy().to_json()?.into(),
            },
        )?;

        // Secrets key
        let sops_key = graph.resource(
            "sops_key",
            &KmsKey {
                description: "Encrypts sops secrets for dagafonov remote dev environment"
                    .to_string(),
                tags: Tags::named(physical("sops")),
            },
        )?;

        graph.resource(
            "sops_alias",
            &KmsAlias {
                name: format!("alias/{}", physical("sops")),
                target_key_id: sops_key.id(),
            },
        )?;

        // The key ARN only exists once the key is created, so the decrypt
        // policy is derived from it rather than read.
        let kms_policy = sops_key
            .arn()
            .try_apply(|arn| policy::kms_decrypt_policy(arn).to_json())?;
        graph.resource(
            "kms_policy",
            &RolePolicy {
                name: physical("kms-policy"),
                role: role.name(),
                policy: kms_policy,
            },
        )?;

        let profile = graph.resource(
            "instance_profile",
            &InstanceProfile {
                name: physical("instance-profile"),
                role: role.name(),
                tags: Tags::defaults(),
            },
        )?;

        // Image lookup
        let ami = graph.data(
            "nixos",
            &AmiLookup {
                owners: vec![NIXOS_AMI_OWNER.to_string()],
                most_recent: true,
                filter: vec![
                    AmiFilter::new("architecture", NIXOS_AMI_ARCH),
                    AmiFilter::new("name", NIXOS_AMI_NAME),
                ],
            },
        )?;

        // Compute. The image is pinned at creation; a newer NixOS release
        // must not replace a running machine.
        let instance = graph.resource_with(
            "machine",
            &Instance {
                ami: ami.id(),
                instance_type: config.instance_type.clone(),
                subnet_id: subnet.id(),
                vpc_security_group_ids: vec![sg.id()],
                iam_instance_profile: profile.name(),
                root_block_device: RootBlockDevice {
                    volume_size: config.volume_size.clone(),
                    volume_type: "gp3".to_string(),
                    encrypted: true,
                    delete_on_termination: true,
                    tags: Tags::named(physical("volume")),
                },
                // Name matches the NixOS networking.hostName
                tags: Tags::named(physical("machine"))
                    .with("Team", TEAM_TAG)
                    .with("Explanation", EXPLANATION_TAG),
            },
            Lifecycle::ignore_changes(&["ami"]),
        )?;

        graph.output(OUTPUT_INSTANCE_ID, instance.id())?;
        graph.output(OUTPUT_PUBLIC_IP, instance.attr("public_ip"))?;
        graph.output(OUTPUT_AMI_ID, ami.id())?;
        graph.output(OUTPUT_SOPS_KEY_ARN, sops_key.arn())?;

        info!(
            instance_type = %config.instance_type,
            volume_size = %config.volume_size,
            nodes = graph.nodes().len(),
            "stack declared"
        );

        Ok(Self {
            config: config.clone(),
            graph,
        })
    }
}
