//! nodegrid.toml configuration parser.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::naming::DEFAULT_STACK_PREFIX;
use crate::types::NodeGroupSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGridConfig {
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub nodegroups: Vec<NodeGroupSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub name: String,
    #[serde(default = "default_stack_prefix")]
    pub stack_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Stack names returned per page by the inventory provider.
    pub page_size: Option<usize>,
    /// Upper bound on a whole discovery scan, in seconds.
    pub timeout_secs: Option<u64>,
}

fn default_stack_prefix() -> String {
    DEFAULT_STACK_PREFIX.to_string()
}

impl NodeGridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: NodeGridConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find a node group by name.
    pub fn nodegroup(&self, name: &str) -> Option<&NodeGroupSpec> {
        self.nodegroups.iter().find(|ng| ng.name == name)
    }

    /// Scaffold a config for a cluster with a single default node group.
    pub fn scaffold(cluster: &str, nodegroup: &str) -> Self {
        NodeGridConfig {
            cluster: ClusterConfig {
                name: cluster.to_string(),
                stack_prefix: default_stack_prefix(),
            },
            discovery: DiscoveryConfig::default(),
            nodegroups: vec![NodeGroupSpec::new(nodegroup)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CapacitySetting;

    #[test]
    fn test_scaffold() {
        let config = NodeGridConfig::scaffold("test-cluster", "ng-1");
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("test-cluster"));
        assert!(toml_str.contains("ng-1"));
        assert!(!toml_str.contains("desired_capacity"));
    }

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
[cluster]
name = "test"
"#;
        let config: NodeGridConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster.name, "test");
        assert_eq!(config.cluster.stack_prefix, "eksctl");
        assert!(config.nodegroups.is_empty());
        assert!(config.discovery.page_size.is_none());
    }

    #[test]
    fn test_parse_nodegroups() {
        let toml_str = r#"
[cluster]
name = "test-cluster"
stack_prefix = "custom"

[discovery]
page_size = 2
timeout_secs = 10

[[nodegroups]]
name = "ng-1"
instance_type = "t2.medium"
desired_capacity = 4
min_size = 0

[[nodegroups]]
name = "ng-2"
"#;
        let config: NodeGridConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cluster.stack_prefix, "custom");
        assert_eq!(config.discovery.page_size, Some(2));

        let ng1 = config.nodegroup("ng-1").unwrap();
        assert_eq!(ng1.instance_type, "t2.medium");
        assert_eq!(ng1.ami_family, "AmazonLinux2");
        assert_eq!(ng1.desired_capacity, CapacitySetting::Set(4));
        assert_eq!(ng1.min_size, CapacitySetting::Set(0));
        assert_eq!(ng1.max_size, CapacitySetting::Unset);

        let ng2 = config.nodegroup("ng-2").unwrap();
        assert_eq!(ng2.desired_capacity, CapacitySetting::Unset);
        assert!(config.nodegroup("ng-3").is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodegrid.toml");
        let config = NodeGridConfig::scaffold("prod", "workers");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = NodeGridConfig::from_file(&path).unwrap();
        assert_eq!(loaded.cluster.name, "prod");
        assert_eq!(loaded.nodegroups[0].name, "workers");
    }

    #[test]
    fn test_from_file_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        let err = NodeGridConfig::from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.toml"), "{err:#}");

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[cluster\nname = ").unwrap();
        let err = NodeGridConfig::from_file(&broken).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config"), "{err:#}");
        assert!(err.to_string().contains("broken.toml"));
    }
}
