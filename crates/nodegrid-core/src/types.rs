//! Shared types used across nodegrid crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stack output holding the node instance role ARN.
pub const INSTANCE_ROLE_ARN_OUTPUT: &str = "InstanceRoleARN";

/// Logical id of the autoscaling group resource inside a node-group stack.
pub const NODEGROUP_LOGICAL_ID: &str = "NodeGroup";

/// Default instance type for node groups that don't name one.
pub const DEFAULT_INSTANCE_TYPE: &str = "m5.large";

/// Default AMI family for node groups that don't name one.
pub const DEFAULT_AMI_FAMILY: &str = "AmazonLinux2";

// ── Node group spec ────────────────────────────────────────────────

/// Requested value for one capacity field of a node group.
///
/// `Unset` means "leave the live value alone", which is distinct from an
/// explicit request for zero nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum CapacitySetting {
    #[default]
    Unset,
    Set(u32),
}

impl CapacitySetting {
    /// The requested value, or `current` when nothing was requested.
    pub fn resolve(self, current: u32) -> u32 {
        match self {
            CapacitySetting::Set(v) => v,
            CapacitySetting::Unset => current,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, CapacitySetting::Unset)
    }
}

impl From<Option<u32>> for CapacitySetting {
    fn from(v: Option<u32>) -> Self {
        v.map_or(CapacitySetting::Unset, CapacitySetting::Set)
    }
}

impl From<CapacitySetting> for Option<u32> {
    fn from(v: CapacitySetting) -> Self {
        match v {
            CapacitySetting::Set(n) => Some(n),
            CapacitySetting::Unset => None,
        }
    }
}

/// Declarative specification of a node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupSpec {
    pub name: String,
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    #[serde(default = "default_ami_family")]
    pub ami_family: String,
    #[serde(default, skip_serializing_if = "CapacitySetting::is_unset")]
    pub desired_capacity: CapacitySetting,
    #[serde(default, skip_serializing_if = "CapacitySetting::is_unset")]
    pub min_size: CapacitySetting,
    #[serde(default, skip_serializing_if = "CapacitySetting::is_unset")]
    pub max_size: CapacitySetting,
}

fn default_instance_type() -> String {
    DEFAULT_INSTANCE_TYPE.to_string()
}

fn default_ami_family() -> String {
    DEFAULT_AMI_FAMILY.to_string()
}

impl NodeGroupSpec {
    /// A spec with default instance settings and no capacity requests.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            instance_type: default_instance_type(),
            ami_family: default_ami_family(),
            desired_capacity: CapacitySetting::Unset,
            min_size: CapacitySetting::Unset,
            max_size: CapacitySetting::Unset,
        }
    }

    pub fn with_desired_capacity(mut self, n: u32) -> Self {
        self.desired_capacity = CapacitySetting::Set(n);
        self
    }

    pub fn with_min_size(mut self, n: u32) -> Self {
        self.min_size = CapacitySetting::Set(n);
        self
    }

    pub fn with_max_size(mut self, n: u32) -> Self {
        self.max_size = CapacitySetting::Set(n);
        self
    }
}

/// Concrete capacity of an autoscaling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub desired: u32,
    pub min: u32,
    pub max: u32,
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (min {}, max {})", self.desired, self.min, self.max)
    }
}

// ── Stacks ─────────────────────────────────────────────────────────

/// A single stack tag. Keys are not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Read-only snapshot of a stack's detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
    pub name: String,
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
}

impl StackRecord {
    /// Look up a stack output by key.
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).map(String::as_str)
    }
}

/// A resource inside a stack, as returned by a resource lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResource {
    pub logical_id: String,
    pub physical_id: String,
}

// ── Node group classification ─────────────────────────────────────

/// How a node group is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroupType {
    /// Provisioned by the managed node-group service.
    Managed,
    /// Self-managed through the stack's own autoscaling group.
    Unmanaged,
}

impl NodeGroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeGroupType::Managed => "managed",
            NodeGroupType::Unmanaged => "unmanaged",
        }
    }
}

impl fmt::Display for NodeGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node group discovered in a cluster's stack inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupSummary {
    pub stack_name: String,
    pub stack_id: String,
    pub status: String,
    pub cluster: String,
    pub name: String,
    pub node_group_type: NodeGroupType,
    /// Capacity read from the stack's current template.
    pub capacity: Option<Capacity>,
    /// Physical id of the `NodeGroup` resource.
    pub autoscaling_group_name: Option<String>,
    pub node_instance_role_arn: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_setting_resolves_against_current() {
        assert_eq!(CapacitySetting::Unset.resolve(3), 3);
        assert_eq!(CapacitySetting::Set(0).resolve(3), 0);
        assert_eq!(CapacitySetting::Set(7).resolve(3), 7);
    }

    #[test]
    fn capacity_setting_maps_json_null_to_unset() {
        let spec: NodeGroupSpec =
            serde_json::from_str(r#"{"name":"ng-1","desired_capacity":null,"min_size":0}"#)
                .unwrap();
        assert_eq!(spec.desired_capacity, CapacitySetting::Unset);
        assert_eq!(spec.min_size, CapacitySetting::Set(0));
        assert_eq!(spec.max_size, CapacitySetting::Unset);
        assert_eq!(spec.instance_type, DEFAULT_INSTANCE_TYPE);
    }

    #[test]
    fn unset_fields_are_not_serialized() {
        let spec = NodeGroupSpec::new("ng-1").with_max_size(10);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains(r#""max_size":10"#));
        assert!(!json.contains("desired_capacity"));
        assert!(!json.contains("min_size"));
    }

    #[test]
    fn stack_output_lookup() {
        let mut outputs = BTreeMap::new();
        outputs.insert(
            INSTANCE_ROLE_ARN_OUTPUT.to_string(),
            "arn:aws:iam::1111:role/eks-nodes-base-role".to_string(),
        );
        let stack = StackRecord {
            name: "eksctl-test-cluster-nodegroup-12345".to_string(),
            id: "id".to_string(),
            status: "CREATE_COMPLETE".to_string(),
            tags: Vec::new(),
            outputs,
        };
        assert_eq!(
            stack.output(INSTANCE_ROLE_ARN_OUTPUT),
            Some("arn:aws:iam::1111:role/eks-nodes-base-role")
        );
        assert_eq!(stack.output("Missing"), None);
    }

    #[test]
    fn node_group_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&NodeGroupType::Managed).unwrap(),
            r#""managed""#
        );
        assert_eq!(NodeGroupType::Unmanaged.to_string(), "unmanaged");
    }
}
