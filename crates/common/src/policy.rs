//! IAM policy documents
//!
//! Trust and permission policies are inline JSON payloads in the provider's
//! policy grammar. They are built from these types and serialized to a string
//! at the declaration site.

use std::collections::BTreeMap;

use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION,
            statement,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
}

/// A single string or a list, as the policy grammar allows for actions and
/// resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for OneOrMany {
    fn from(s: &str) -> Self {
        OneOrMany::One(s.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(s: String) -> Self {
        OneOrMany::One(s)
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(items: &[&str]) -> Self {
        OneOrMany::Many(items.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: OneOrMany,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<BTreeMap<String, String>>,
    /// Operator -> condition key -> value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BTreeMap<String, BTreeMap<String, String>>>,
}

impl Statement {
    pub fn allow(action: impl Into<OneOrMany>) -> Self {
        Self {
            effect: Effect::Allow,
            action: action.into(),
            resource: None,
            principal: None,
            condition: None,
        }
    }

    pub fn on(mut self, resource: impl Into<OneOrMany>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn principal(mut self, kind: &str, value: &str) -> Self {
        self.principal
            .get_or_insert_with(BTreeMap::new)
            .insert(kind.to_string(), value.to_string());
        self
    }

    pub fn when(mut self, operator: &str, key: &str, value: &str) -> Self {
        self.condition
            .get_or_insert_with(BTreeMap::new)
            .entry(operator.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }
}

/// Trust policy letting a service principal assume the role
pub fn assume_role_policy(service: &str) -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow("sts:AssumeRole").principal("Service", service)
    ])
}

/// Model invocation through Bedrock inference profiles and foundation models,
/// plus the marketplace subscription check Bedrock performs on the caller's
/// behalf.
pub fn bedrock_invoke_policy() -> PolicyDocument {
    PolicyDocument::new(vec![
        Statement::allow(
            &[
                "bedrock:InvokeModel",
                "bedrock:InvokeModelWithResponseStream",
                "bedrock:ListInferenceProfiles",
            ][..],
        )
        .on(&[
            "arn:aws:bedrock:*:*:inference-profile/*",
            "arn:aws:bedrock:*:*:application-inference-profile/*",
            "arn:aws:bedrock:*:*:foundation-model/*",
        ][..]),
        Statement::allow("aws-marketplace:ViewSubscriptions")
            .on("*")
            .when("StringEquals", "aws:CalledViaLast", "bedrock.amazonaws.com"),
    ])
}

/// Decrypt with a single KMS key
pub fn kms_decrypt_policy(key_arn: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement::allow("kms:Decrypt").on(key_arn)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trust_policy_shape() {
        let doc = serde_json::to_value(assume_role_policy("ec2.amazonaws.com")).unwrap();
        assert_eq!(
            doc,
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": "sts:AssumeRole",
                    "Principal": { "Service": "ec2.amazonaws.com" }
                }]
            })
        );
    }

    #[test]
    fn test_bedrock_policy_condition() {
        let doc = serde_json::to_value(bedrock_invoke_policy()).unwrap();
        let statements = doc["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0]["Action"].as_array().unwrap().len(), 3);
        assert_eq!(statements[0]["Resource"].as_array().unwrap().len(), 3);
        assert_eq!(
            statements[1]["Condition"]["StringEquals"]["aws:CalledViaLast"],
            "bedrock.amazonaws.com"
        );
        assert_eq!(statements[1]["Resource"], "*");
    }

    #[test]
    fn test_kms_policy_targets_key() {
        let doc = serde_json::to_value(kms_decrypt_policy("arn:aws:kms:eu-west-1:1:key/x")).unwrap();
        assert_eq!(doc["Statement"][0]["Action"], "kms:Decrypt");
        assert_eq!(doc["Statement"][0]["Resource"], "arn:aws:kms:eu-west-1:1:key/x");
    }
}
