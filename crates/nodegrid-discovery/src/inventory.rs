//! File-backed stack inventory.
//!
//! A JSON snapshot of a control plane's stacks, served through the same
//! collaborator traits a live backend implements:
//!
//! ```json
//! {"stacks": [{"name": "...", "id": "...", "status": "...",
//!              "tags": [{"key": "...", "value": "..."}],
//!              "outputs": {"InstanceRoleARN": "..."},
//!              "resources": {"NodeGroup": "asg-name"},
//!              "template": "{...}"}]}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use nodegrid_core::{StackRecord, StackResource};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{StackPage, StackProvider, StackUpdater};

/// Stacks per page when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

const UPDATE_COMPLETE: &str = "UPDATE_COMPLETE";

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid inventory JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inventory has no backing file")]
    NoPath,
}

/// One stack in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStack {
    #[serde(flatten)]
    pub record: StackRecord,
    /// Logical id to physical id.
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
    #[serde(default)]
    pub template: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub stacks: Vec<InventoryStack>,
}

impl Inventory {
    fn find(&self, name: &str) -> ProviderResult<&InventoryStack> {
        self.stacks
            .iter()
            .find(|s| s.record.name == name)
            .ok_or_else(|| ProviderError::StackNotFound(name.to_string()))
    }
}

/// [`StackProvider`] and [`StackUpdater`] over an in-memory [`Inventory`].
///
/// Page tokens are stack indexes. Listing ignores the cluster, leaving the
/// name match to the caller.
pub struct InventoryProvider {
    inventory: RwLock<Inventory>,
    page_size: usize,
    path: Option<PathBuf>,
}

impl InventoryProvider {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: RwLock::new(inventory),
            page_size: DEFAULT_PAGE_SIZE,
            path: None,
        }
    }

    /// Load an inventory file. [`save`](Self::save) writes back to it.
    pub fn from_file(path: &Path) -> Result<Self, InventoryError> {
        let content = std::fs::read_to_string(path)?;
        let inventory: Inventory = serde_json::from_str(&content)?;
        debug!(path = %path.display(), stacks = inventory.stacks.len(), "loaded inventory");

        let mut provider = Self::new(inventory);
        provider.path = Some(path.to_path_buf());
        Ok(provider)
    }

    /// Serve at most `page_size` names per page. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Write the inventory back to the file it was loaded from.
    pub async fn save(&self) -> Result<(), InventoryError> {
        let path = self.path.as_deref().ok_or(InventoryError::NoPath)?;
        self.save_to(path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), InventoryError> {
        let json = serde_json::to_string_pretty(&*self.inventory.read().await)?;
        std::fs::write(path, json + "\n")?;
        debug!(path = %path.display(), "saved inventory");
        Ok(())
    }

    /// A copy of the current inventory.
    pub async fn snapshot(&self) -> Inventory {
        self.inventory.read().await.clone()
    }
}

impl StackProvider for InventoryProvider {
    async fn list_stack_names(&self, _cluster: &str, next_token: Option<&str>) -> ProviderResult<StackPage> {
        let start = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ProviderError::request("ListStacks", format!("invalid next token {token:?}")))?,
        };

        let inventory = self.inventory.read().await;
        let total = inventory.stacks.len();
        if start > total {
            return Err(ProviderError::request(
                "ListStacks",
                format!("invalid next token {start:?}"),
            ));
        }

        let end = (start + self.page_size).min(total);
        Ok(StackPage {
            names: inventory.stacks[start..end]
                .iter()
                .map(|s| s.record.name.clone())
                .collect(),
            next_token: (end < total).then(|| end.to_string()),
        })
    }

    async fn describe_stack(&self, name: &str) -> ProviderResult<StackRecord> {
        Ok(self.inventory.read().await.find(name)?.record.clone())
    }

    async fn get_template(&self, name: &str) -> ProviderResult<String> {
        Ok(self.inventory.read().await.find(name)?.template.clone())
    }

    async fn describe_resource(&self, name: &str, logical_id: &str) -> ProviderResult<StackResource> {
        let inventory = self.inventory.read().await;
        let physical_id = inventory
            .find(name)?
            .resources
            .get(logical_id)
            .ok_or_else(|| ProviderError::ResourceNotFound {
                stack: name.to_string(),
                logical_id: logical_id.to_string(),
            })?;
        Ok(StackResource {
            logical_id: logical_id.to_string(),
            physical_id: physical_id.clone(),
        })
    }
}

impl StackUpdater for InventoryProvider {
    async fn update_stack(&self, name: &str, template: &str) -> ProviderResult<()> {
        let mut inventory = self.inventory.write().await;
        let stack = inventory
            .stacks
            .iter_mut()
            .find(|s| s.record.name == name)
            .ok_or_else(|| ProviderError::StackNotFound(name.to_string()))?;
        stack.template = template.to_string();
        stack.record.status = UPDATE_COMPLETE.to_string();
        debug!(stack = %name, "stack template replaced");
        Ok(())
    }
}
