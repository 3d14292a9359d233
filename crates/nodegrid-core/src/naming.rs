//! Node-group stack naming: `<prefix>-<cluster>-nodegroup-<name>`.

use regex::Regex;

/// Prefix of every stack created by the tooling.
pub const DEFAULT_STACK_PREFIX: &str = "eksctl";

/// Build the stack name for a node group.
pub fn nodegroup_stack_name(prefix: &str, cluster: &str, nodegroup: &str) -> String {
    format!("{prefix}-{cluster}-nodegroup-{nodegroup}")
}

/// Compiled matcher for the node-group stacks of one cluster.
#[derive(Debug, Clone)]
pub struct StackNamePattern {
    regex: Regex,
}

impl StackNamePattern {
    /// Compile the matcher. Prefix and cluster are matched literally.
    pub fn new(prefix: &str, cluster: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            "^{}-{}-nodegroup-(?P<name>.+)$",
            regex::escape(prefix),
            regex::escape(cluster)
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    /// The node-group name encoded in `stack_name`, if it belongs to this
    /// cluster.
    pub fn nodegroup_name<'a>(&self, stack_name: &'a str) -> Option<&'a str> {
        self.regex
            .captures(stack_name)
            .and_then(|c| c.name("name"))
            .map(|m| m.as_str())
    }
}
