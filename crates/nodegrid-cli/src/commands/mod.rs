pub mod get;
pub mod scale;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::sync::watch;
use tracing::debug;

use nodegrid_core::NodeGridConfig;
use nodegrid_core::naming::DEFAULT_STACK_PREFIX;
use nodegrid_discovery::{InventoryProvider, NodeGroupScaler, StackSummaryAggregator};

/// Where a command runs: the inventory, the cluster, and discovery settings
/// merged from flags and the optional config file.
pub struct Target {
    pub inventory: PathBuf,
    pub cluster: String,
    pub stack_prefix: String,
    pub page_size: Option<usize>,
    pub timeout: Option<Duration>,
    pub config: Option<NodeGridConfig>,
}

impl Target {
    /// Flags win over the config file.
    pub fn resolve(
        inventory: PathBuf,
        cluster: Option<String>,
        config_path: Option<&Path>,
        timeout_secs: Option<u64>,
    ) -> anyhow::Result<Self> {
        let config = config_path.map(NodeGridConfig::from_file).transpose()?;

        let cluster = match (cluster, &config) {
            (Some(c), _) => c,
            (None, Some(cfg)) => cfg.cluster.name.clone(),
            (None, None) => bail!("--cluster is required when no --config is given"),
        };
        if cluster.is_empty() {
            bail!("cluster name must not be empty");
        }

        let stack_prefix = config
            .as_ref()
            .map_or_else(|| DEFAULT_STACK_PREFIX.to_string(), |c| c.cluster.stack_prefix.clone());
        let page_size = config.as_ref().and_then(|c| c.discovery.page_size);
        let timeout = timeout_secs
            .or_else(|| config.as_ref().and_then(|c| c.discovery.timeout_secs))
            .map(Duration::from_secs);

        debug!(cluster = %cluster, prefix = %stack_prefix, ?timeout, "resolved target");

        Ok(Self {
            inventory,
            cluster,
            stack_prefix,
            page_size,
            timeout,
            config,
        })
    }

    pub fn provider(&self) -> anyhow::Result<Arc<InventoryProvider>> {
        let mut provider = InventoryProvider::from_file(&self.inventory)
            .with_context(|| format!("failed to load inventory {}", self.inventory.display()))?;
        if let Some(size) = self.page_size {
            provider = provider.with_page_size(size);
        }
        Ok(Arc::new(provider))
    }

    pub fn aggregator(&self, provider: Arc<InventoryProvider>) -> StackSummaryAggregator<InventoryProvider> {
        let mut agg = StackSummaryAggregator::new(provider)
            .with_stack_prefix(&self.stack_prefix)
            .with_cancel(cancel_on_ctrl_c());
        if let Some(t) = self.timeout {
            agg = agg.with_timeout(t);
        }
        agg
    }

    pub fn scaler(&self, provider: Arc<InventoryProvider>) -> NodeGroupScaler<InventoryProvider> {
        let mut scaler = NodeGroupScaler::new(provider)
            .with_stack_prefix(&self.stack_prefix)
            .with_cancel(cancel_on_ctrl_c());
        if let Some(t) = self.timeout {
            scaler = scaler.with_timeout(t);
        }
        scaler
    }
}

/// A cancel signal that flips to `true` on Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(true);
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_flag_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodegrid.toml");
        let mut cfg = NodeGridConfig::scaffold("from-config", "ng-1");
        cfg.cluster.stack_prefix = "acme".to_string();
        cfg.discovery.timeout_secs = Some(30);
        std::fs::write(&path, cfg.to_toml_string().unwrap()).unwrap();

        let t = Target::resolve("inv.json".into(), Some("from-flag".into()), Some(&path), None).unwrap();
        assert_eq!(t.cluster, "from-flag");
        assert_eq!(t.stack_prefix, "acme");
        assert_eq!(t.timeout, Some(Duration::from_secs(30)));

        let t = Target::resolve("inv.json".into(), None, Some(&path), Some(5)).unwrap();
        assert_eq!(t.cluster, "from-config");
        assert_eq!(t.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn cluster_is_required() {
        assert!(Target::resolve("inv.json".into(), None, None, None).is_err());
        assert!(Target::resolve("inv.json".into(), Some(String::new()), None, None).is_err());

        let t = Target::resolve("inv.json".into(), Some("c".into()), None, None).unwrap();
        assert_eq!(t.stack_prefix, DEFAULT_STACK_PREFIX);
        assert_eq!(t.timeout, None);
    }
}
