//! Node-group identity from stack tags.
//!
//! Stacks have been tagged under three schemes over time. Each resolved
//! attribute has one priority table listing the keys to try, current scheme
//! first; the first key present wins, and when a key repeats the first tag
//! carrying it wins.

use thiserror::Error;

use crate::types::{NodeGroupType, Tag};

/// Current node-group name tag.
pub const NODEGROUP_NAME_TAG: &str = "alpha.eksctl.io/nodegroup-name";

/// Name tag used before the `alpha.eksctl.io` scheme.
pub const LEGACY_NODEGROUP_NAME_TAG: &str = "eksctl.cluster.k8s.io/v1alpha1/nodegroup-name";

/// Oldest tag, carrying the node-group id.
pub const LEGACY_NODEGROUP_ID_TAG: &str = "eksctl.io/v1alpha2/nodegroup-name";

/// Node-group provisioning type tag.
pub const NODEGROUP_TYPE_TAG: &str = "alpha.eksctl.io/nodegroup-type";

/// Current cluster name tag.
pub const CLUSTER_NAME_TAG: &str = "alpha.eksctl.io/cluster-name";

/// Cluster name tag used before the `alpha.eksctl.io` scheme.
pub const LEGACY_CLUSTER_NAME_TAG: &str = "eksctl.cluster.k8s.io/v1alpha1/cluster-name";

const NAME_PRIORITY: &[&str] = &[
    NODEGROUP_NAME_TAG,
    LEGACY_NODEGROUP_NAME_TAG,
    LEGACY_NODEGROUP_ID_TAG,
];

const CLUSTER_PRIORITY: &[&str] = &[CLUSTER_NAME_TAG, LEGACY_CLUSTER_NAME_TAG];

const TYPE_PRIORITY: &[&str] = &[NODEGROUP_TYPE_TAG];

/// Type of node groups whose stacks predate the type tag.
const UNTYPED_DEFAULT: NodeGroupType = NodeGroupType::Unmanaged;

/// Errors from classifying a stack's tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("no nodegroup name tag found")]
    NameNotFound,

    #[error("invalid nodegroup type {0:?}: expected \"managed\" or \"unmanaged\"")]
    InvalidType(String),
}

/// Identity of a node group resolved from its stack tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    pub node_group_type: NodeGroupType,
    /// Cluster named by the tags, if any scheme recorded it.
    pub cluster: Option<String>,
}

fn first_match<'a>(tags: &'a [Tag], priority: &[&str]) -> Option<&'a str> {
    priority.iter().find_map(|key| {
        tags.iter()
            .find(|t| t.key == *key)
            .map(|t| t.value.as_str())
    })
}

/// Resolve the node-group name.
pub fn resolve_name(tags: &[Tag]) -> Option<&str> {
    first_match(tags, NAME_PRIORITY)
}

/// Resolve the owning cluster's name.
pub fn resolve_cluster(tags: &[Tag]) -> Option<&str> {
    first_match(tags, CLUSTER_PRIORITY)
}

/// Resolve the node-group type.
///
/// A node group without a name tag can't be classified at all. A missing
/// type tag means the stack predates it, so it is unmanaged.
pub fn resolve_type(tags: &[Tag]) -> Result<NodeGroupType, ClassifyError> {
    if resolve_name(tags).is_none() {
        return Err(ClassifyError::NameNotFound);
    }

    match first_match(tags, TYPE_PRIORITY) {
        None => Ok(UNTYPED_DEFAULT),
        Some("managed") => Ok(NodeGroupType::Managed),
        Some("unmanaged") => Ok(NodeGroupType::Unmanaged),
        Some(other) => Err(ClassifyError::InvalidType(other.to_string())),
    }
}

/// Resolve name, type and cluster in one pass.
pub fn classify(tags: &[Tag]) -> Result<Classification, ClassifyError> {
    let node_group_type = resolve_type(tags)?;
    let name = resolve_name(tags).ok_or(ClassifyError::NameNotFound)?;
    Ok(Classification {
        name: name.to_string(),
        node_group_type,
        cluster: resolve_cluster(tags).map(str::to_string),
    })
}
