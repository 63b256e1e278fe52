//! Structural checks on the synthesized Terraform configuration

use remote_dev_common::value::{scan_references, Mode};
use remote_dev_common::StackConfig;
use remote_dev_e2e::TerraformWorkdir;
use serde_json::{json, Value};

fn synthesize(overrides: &[&str]) -> Value {
    let mut config = StackConfig::default();
    for assignment in overrides {
        config.apply_override(assignment).expect("valid override");
    }
    TerraformWorkdir::synthesize(&config)
        .expect("synthesize stack")
        .document()
        .expect("read main.tf.json")
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().expect("object").keys().cloned().collect();
    keys.sort();
    keys
}

fn resource<'a>(doc: &'a Value, type_name: &str, name: &str) -> &'a Value {
    let value = &doc["resource"][type_name][name];
    assert!(value.is_object(), "missing {type_name}.{name}");
    value
}

#[test]
fn writes_main_tf_json_into_workdir() {
    let workdir = TerraformWorkdir::synthesize(&StackConfig::default()).expect("synthesize stack");
    let main_file = workdir.main_file();
    assert_eq!(main_file.file_name().and_then(|n| n.to_str()), Some("main.tf.json"));
    assert_eq!(main_file.parent(), Some(workdir.path()));
    assert!(main_file.is_file());
}

#[test]
fn no_overrides_uses_default_size() {
    let doc = synthesize(&[]);
    let machine = resource(&doc, "aws_instance", "machine");
    assert_eq!(machine["instance_type"], "m8g.xlarge");
    assert_eq!(machine["root_block_device"]["volume_size"], 100);
}

#[test]
fn overrides_reach_the_instance() {
    let doc = synthesize(&["instanceType=m8g.2xlarge", "volumeSize=200"]);
    let machine = resource(&doc, "aws_instance", "machine");
    assert_eq!(machine["instance_type"], "m8g.2xlarge");
    assert_eq!(machine["root_block_device"]["volume_size"], 200);
}

#[test]
fn root_volume_is_encrypted_gp3_and_deleted_with_instance() {
    let doc = synthesize(&[]);
    let disk = &resource(&doc, "aws_instance", "machine")["root_block_device"];
    assert_eq!(disk["volume_type"], "gp3");
    assert_eq!(disk["encrypted"], true);
    assert_eq!(disk["delete_on_termination"], true);
}

#[test]
fn every_reference_points_at_a_declared_node() {
    let doc = synthesize(&[]);
    let rendered = serde_json::to_string(&doc).unwrap();
    let refs = scan_references(&rendered);
    assert!(refs.len() >= 10);
    for r in refs {
        let section = match r.address.mode {
            Mode::Managed => "resource",
            Mode::Data => "data",
        };
        assert!(
            doc[section][&r.address.type_name][&r.address.name].is_object(),
            "dangling reference {}",
            r
        );
    }
}

#[test]
fn security_group_blocks_all_inbound() {
    let doc = synthesize(&[]);
    let sg = resource(&doc, "aws_security_group", "sg");
    assert_eq!(sg["ingress"].as_array().unwrap().len(), 0);
    let egress = sg["egress"].as_array().unwrap();
    assert_eq!(egress.len(), 1);
    assert_eq!(egress[0]["protocol"], "-1");
    assert_eq!(egress[0]["cidr_blocks"], json!(["0.0.0.0/0"]));
}

/// Terraform JSON reads inline routes and rules as object lists, which must
/// spell out every attribute of the provider's object type.
#[test]
fn inline_objects_spell_out_every_attribute() {
    let doc = synthesize(&[]);

    let route = &resource(&doc, "aws_route_table", "rt")["route"][0];
    assert_eq!(
        keys(route),
        [
            "carrier_gateway_id",
            "cidr_block",
            "core_network_arn",
            "destination_prefix_list_id",
            "egress_only_gateway_id",
            "gateway_id",
            "ipv6_cidr_block",
            "local_gateway_id",
            "nat_gateway_id",
            "network_interface_id",
            "transit_gateway_id",
            "vpc_endpoint_id",
            "vpc_peering_connection_id",
        ]
    );

    let rule = &resource(&doc, "aws_security_group", "sg")["egress"][0];
    assert_eq!(
        keys(rule),
        [
            "cidr_blocks",
            "description",
            "from_port",
            "ipv6_cidr_blocks",
            "prefix_list_ids",
            "protocol",
            "security_groups",
            "self",
            "to_port",
        ]
    );
    assert!(rule["self"].is_null());
}

#[test]
fn route_table_has_one_default_route_to_gateway() {
    let doc = synthesize(&[]);
    let routes = resource(&doc, "aws_route_table", "rt")["route"].as_array().unwrap().clone();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["cidr_block"], "0.0.0.0/0");
    assert_eq!(routes[0]["gateway_id"], "${aws_internet_gateway.igw.id}");
    assert!(routes[0]["nat_gateway_id"].is_null());
}

#[test]
fn tagged_resources_carry_protection_tag() {
    let doc = synthesize(&[]);
    let mut tagged = 0;
    for by_name in doc["resource"].as_object().unwrap().values() {
        for body in by_name.as_object().unwrap().values() {
            if let Some(tags) = body.get("tags") {
                assert_eq!(tags["do-not-nuke"], "true");
                tagged += 1;
            }
        }
    }
    assert_eq!(tagged, 9);
}

#[test]
fn instance_ignores_image_drift() {
    let doc = synthesize(&[]);
    let machine = resource(&doc, "aws_instance", "machine");
    assert_eq!(machine["lifecycle"]["ignore_changes"], json!(["ami"]));
    assert_eq!(machine["ami"], "${data.aws_ami.nixos.id}");
}

#[test]
fn image_lookup_filters() {
    let doc = synthesize(&[]);
    let ami = &doc["data"]["aws_ami"]["nixos"];
    assert_eq!(ami["owners"], json!(["427812963091"]));
    assert_eq!(ami["most_recent"], true);
    assert_eq!(
        ami["filter"],
        json!([
            { "name": "architecture", "values": ["arm64"] },
            { "name": "name", "values": ["nixos/25.11.*-aarch64-linux"] }
        ])
    );
}

#[test]
fn outputs_are_exposed() {
    let doc = synthesize(&[]);
    let outputs = doc["output"].as_object().unwrap();
    let mut names: Vec<_> = outputs.keys().cloned().collect();
    names.sort();
    assert_eq!(names, ["amiId", "instanceId", "publicIp", "sopsKeyArn"]);
}
