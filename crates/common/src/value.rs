//! Deferred values
//!
//! An attribute such as a key ARN does not exist until the provisioning
//! engine has created its owner. It is carried as an [`AttrRef`] and rendered
//! as a `${type.name.attr}` interpolation, which the engine resolves once the
//! owner is realized. Consumers that need to derive a value from it use
//! [`Output::apply`] instead of reading it.

use std::fmt;

use serde::{Serialize, Serializer};

/// Whether a node is a managed resource or a data-source lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Managed,
    Data,
}

/// Address of a node in the declaration graph, e.g. `aws_vpc.vpc` or
/// `data.aws_ami.nixos`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub mode: Mode,
    pub type_name: String,
    pub name: String,
}

impl Address {
    pub fn managed(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: Mode::Managed,
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    pub fn data(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode: Mode::Data,
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Reference one of this node's attributes
    pub fn attr(&self, attribute: impl Into<String>) -> AttrRef {
        AttrRef {
            address: self.clone(),
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Managed => write!(f, "{}.{}", self.type_name, self.name),
            Mode::Data => write!(f, "data.{}.{}", self.type_name, self.name),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single attribute of a graph node whose value is only known after apply
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrRef {
    pub address: Address,
    pub attribute: String,
}

impl AttrRef {
    /// Bare expression, e.g. `aws_kms_key.sops.arn`
    pub fn expression(&self) -> String {
        format!("{}.{}", self.address, self.attribute)
    }

    /// Interpolation token, e.g. `${aws_kms_key.sops.arn}`
    pub fn interpolation(&self) -> String {
        format!("${{{}}}", self.expression())
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

/// A value that is either known at declaration time or produced by the
/// engine after some resource is realized
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Known(serde_json::Value),
    Deferred(AttrRef),
    /// A string derived from one or more deferred values
    Template { template: String, refs: Vec<AttrRef> },
}

impl Output {
    /// Derive a new value once this one is realized.
    ///
    /// The closure receives the value as it will appear in the rendered
    /// configuration. For deferred values that is the interpolation token, so
    /// the closure must only embed it, never inspect it.
    pub fn apply<F>(self, f: F) -> Output
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            Output::Known(serde_json::Value::String(s)) => Output::Known(f(&s).into()),
            Output::Known(other) => Output::Known(f(&other.to_string()).into()),
            Output::Deferred(r) => Output::Template {
                template: f(&r.interpolation()),
                refs: vec![r],
            },
            Output::Template { template, refs } => Output::Template {
                template: f(&template),
                refs,
            },
        }
    }

    /// Fallible variant of [`Output::apply`]
    pub fn try_apply<F, E>(self, f: F) -> Result<Output, E>
    where
        F: FnOnce(&str) -> Result<String, E>,
    {
        let mut failure = None;
        let out = self.apply(|value| {
            f(value).unwrap_or_else(|e| {
                failure = Some(e);
                String::new()
            })
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    /// Deferred values this output depends on
    pub fn refs(&self) -> Vec<AttrRef> {
        match self {
            Output::Known(_) => Vec::new(),
            Output::Deferred(r) => vec![r.clone()],
            Output::Template { refs, .. } => refs.clone(),
        }
    }

    /// Rendered form as it appears in the engine configuration
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Output::Known(v) => v.clone(),
            Output::Deferred(r) => serde_json::Value::String(r.interpolation()),
            Output::Template { template, .. } => serde_json::Value::String(template.clone()),
        }
    }
}

impl From<AttrRef> for Output {
    fn from(r: AttrRef) -> Self {
        Output::Deferred(r)
    }
}

impl From<&str> for Output {
    fn from(s: &str) -> Self {
        Output::Known(s.into())
    }
}

impl From<String> for Output {
    fn from(s: String) -> Self {
        Output::Known(s.into())
    }
}

impl Serialize for Output {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Extract every node reference from a rendered string by scanning its
/// `${...}` interpolations.
pub fn scan_references(text: &str) -> Vec<AttrRef> {
    let mut refs = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else { break };
        if let Some(r) = parse_expression(after[..end].trim()) {
            if !refs.contains(&r) {
                refs.push(r);
            }
        }
        rest = &after[end + 1..];
    }
    refs
}

/// Walk a rendered attribute tree and collect every reference in it
pub fn collect_references(value: &serde_json::Value, into: &mut Vec<AttrRef>) {
    match value {
        serde_json::Value::String(s) => {
            for r in scan_references(s) {
                if !into.contains(&r) {
                    into.push(r);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_references(item, into);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_references(item, into);
            }
        }
        _ => {}
    }
}

fn parse_expression(expr: &str) -> Option<AttrRef> {
    let parts: Vec<&str> = expr.split('.').collect();
    let (address, attribute) = match parts.as_slice() {
        ["data", type_name, name, attribute, ..] => (Address::data(*type_name, *name), *attribute),
        [type_name, name, attribute, ..] => (Address::managed(*type_name, *name), *attribute),
        _ => return None,
    };
    // `aws_instance.machine.root_block_device[0]` refers to `root_block_device`
    let attribute = attribute.split('[').next().unwrap_or(attribute);
    let valid = [&address.type_name, &address.name]
        .iter()
        .all(|s| is_identifier(s))
        && is_identifier(attribute);
    valid.then(|| address.attr(attribute))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        assert_eq!(Address::managed("aws_vpc", "vpc").to_string(), "aws_vpc.vpc");
        assert_eq!(Address::data("aws_ami", "nixos").to_string(), "data.aws_ami.nixos");
    }

    #[test]
    fn test_deferred_renders_as_interpolation() {
        let out = Output::from(Address::managed("aws_kms_key", "sops").attr("arn"));
        assert_eq!(out.to_json(), serde_json::json!("${aws_kms_key.sops.arn}"));
        assert_eq!(out.refs().len(), 1);
    }

    #[test]
    fn test_apply_keeps_dependency() {
        let arn = Output::from(Address::managed("aws_kms_key", "sops").attr("arn"));
        let policy = arn.apply(|arn| format!("{{\"Resource\":\"{}\"}}", arn));
        assert_eq!(
            policy.to_json(),
            serde_json::json!("{\"Resource\":\"${aws_kms_key.sops.arn}\"}")
        );
        assert_eq!(policy.refs().len(), 1);
        assert_eq!(policy.refs()[0].attribute, "arn");
    }

    #[test]
    fn test_apply_on_known_value() {
        let out = Output::from("abc").apply(|s| s.to_uppercase());
        assert_eq!(out, Output::Known("ABC".into()));
    }

    #[test]
    fn test_scan_references() {
        let refs = scan_references("id=${data.aws_ami.nixos.id} sg=${aws_security_group.sg.id}");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].address, Address::data("aws_ami", "nixos"));
        assert_eq!(refs[1].address, Address::managed("aws_security_group", "sg"));
    }

    #[test]
    fn test_scan_ignores_non_references() {
        assert!(scan_references("plain text").is_empty());
        assert!(scan_references("${var}").is_empty());
        assert!(scan_references("${1.2.3}").is_empty());
        assert!(scan_references("unterminated ${aws_vpc.vpc.id").is_empty());
    }

    #[test]
    fn test_scan_strips_index() {
        let refs = scan_references("${aws_instance.machine.root_block_device[0].volume_id}");
        assert_eq!(refs[0].attribute, "root_block_device");
    }
}
