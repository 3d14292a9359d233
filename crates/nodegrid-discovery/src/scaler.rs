//! Node-group scaler — pushes a spec's capacity to its stack.
//!
//! The stack is located by naming convention, its current template fetched
//! and reconciled against the spec. An update is submitted only when the
//! reconciler produced a new template.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use nodegrid_core::naming::DEFAULT_STACK_PREFIX;
use nodegrid_core::{NodeGroupSpec, nodegroup_stack_name};
use nodegrid_scale::{ReconcileOutcome, reconcile};

use crate::error::DiscoveryResult;
use crate::guard::CallGuard;
use crate::provider::{StackProvider, StackUpdater};

pub struct NodeGroupScaler<P> {
    provider: Arc<P>,
    stack_prefix: String,
    cancel: Option<watch::Receiver<bool>>,
    timeout: Option<Duration>,
}

impl<P: StackProvider> NodeGroupScaler<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            stack_prefix: DEFAULT_STACK_PREFIX.to_string(),
            cancel: None,
            timeout: None,
        }
    }

    pub fn with_stack_prefix(mut self, prefix: &str) -> Self {
        self.stack_prefix = prefix.to_string();
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn stack_name(&self, cluster: &str, spec: &NodeGroupSpec) -> String {
        nodegroup_stack_name(&self.stack_prefix, cluster, &spec.name)
    }

    /// Compute the template `spec` calls for without submitting it.
    pub async fn scale_template(&self, cluster: &str, spec: &NodeGroupSpec) -> DiscoveryResult<ReconcileOutcome> {
        let guard = CallGuard::new(self.cancel.clone(), self.timeout);
        self.reconcile_stack(&guard, &self.stack_name(cluster, spec), spec).await
    }

    async fn reconcile_stack(
        &self,
        guard: &CallGuard,
        stack_name: &str,
        spec: &NodeGroupSpec,
    ) -> DiscoveryResult<ReconcileOutcome> {
        let record = guard.run(self.provider.describe_stack(stack_name)).await?;
        debug!(stack = %stack_name, status = %record.status, "found nodegroup stack");

        let template = guard.run(self.provider.get_template(stack_name)).await?;
        Ok(reconcile(&template, spec)?)
    }
}

impl<P: StackProvider + StackUpdater> NodeGroupScaler<P> {
    /// Reconcile and, if the capacity changed, update the stack.
    pub async fn scale(&self, cluster: &str, spec: &NodeGroupSpec) -> DiscoveryResult<ReconcileOutcome> {
        let guard = CallGuard::new(self.cancel.clone(), self.timeout);
        let stack_name = self.stack_name(cluster, spec);
        let outcome = self.reconcile_stack(&guard, &stack_name, spec).await?;

        match &outcome {
            ReconcileOutcome::Unchanged => {
                info!(stack = %stack_name, nodegroup = %spec.name, "nodegroup already at requested capacity");
            }
            ReconcileOutcome::Updated(template) => {
                guard.run(self.provider.update_stack(&stack_name, template)).await?;
                info!(stack = %stack_name, nodegroup = %spec.name, "nodegroup stack update submitted");
            }
        }
        Ok(outcome)
    }
}
