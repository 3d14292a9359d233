//! Stack control-plane collaborator traits.
//!
//! Implementations talk to the real control plane; [`InventoryProvider`]
//! serves a JSON snapshot, and tests inject recording mocks.
//!
//! [`InventoryProvider`]: crate::inventory::InventoryProvider

use std::future::Future;

use nodegrid_core::{StackRecord, StackResource};

use crate::error::ProviderResult;

/// One page of stack names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackPage {
    pub names: Vec<String>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Read access to the stack control plane.
pub trait StackProvider: Send + Sync {
    /// List one page of stack names. `cluster` may be used to narrow the
    /// listing, but callers still filter names locally.
    fn list_stack_names(
        &self,
        cluster: &str,
        next_token: Option<&str>,
    ) -> impl Future<Output = ProviderResult<StackPage>> + Send;

    /// Fetch a stack's tags, status and outputs.
    fn describe_stack(&self, name: &str) -> impl Future<Output = ProviderResult<StackRecord>> + Send;

    /// Fetch a stack's current template body.
    fn get_template(&self, name: &str) -> impl Future<Output = ProviderResult<String>> + Send;

    /// Look up one resource of a stack by logical id.
    fn describe_resource(
        &self,
        name: &str,
        logical_id: &str,
    ) -> impl Future<Output = ProviderResult<StackResource>> + Send;
}

/// Write access to the stack control plane.
pub trait StackUpdater: Send + Sync {
    /// Submit a new template for an existing stack.
    fn update_stack(&self, name: &str, template: &str) -> impl Future<Output = ProviderResult<()>> + Send;
}
