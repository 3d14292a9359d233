//! Stack summary aggregator — builds node-group summaries for a cluster.
//!
//! Candidates come from a [`CandidateScan`]; each one is described,
//! classified and enriched in discovery order. The first fatal failure
//! aborts the scan, and earlier summaries are dropped with it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use nodegrid_core::naming::DEFAULT_STACK_PREFIX;
use nodegrid_core::tags::{self, ClassifyError};
use nodegrid_core::{INSTANCE_ROLE_ARN_OUTPUT, NODEGROUP_LOGICAL_ID, NodeGroupSummary, StackNamePattern};
use nodegrid_scale::current_capacity;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::guard::CallGuard;
use crate::provider::StackProvider;
use crate::scan::{Candidate, CandidateScan};

/// A candidate left out of the summaries because its tags didn't classify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStack {
    pub stack_name: String,
    pub reason: ClassifyError,
}

/// Everything one scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub summaries: Vec<NodeGroupSummary>,
    pub skipped: Vec<SkippedStack>,
}

/// Discovers a cluster's node groups through a [`StackProvider`].
pub struct StackSummaryAggregator<P> {
    provider: Arc<P>,
    stack_prefix: String,
    cancel: Option<watch::Receiver<bool>>,
    timeout: Option<Duration>,
}

impl<P: StackProvider> StackSummaryAggregator<P> {
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

    /// Abort scans once `true` is sent on the channel.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Bound each scan as a whole.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Summaries of the cluster's node groups, in discovery order.
    pub async fn list_summaries(
        &self,
        cluster: &str,
        name_filter: Option<&str>,
    ) -> DiscoveryResult<Vec<NodeGroupSummary>> {
        Ok(self.scan(cluster, name_filter).await?.summaries)
    }

    /// Scan the cluster, also reporting candidates that failed classification.
    pub async fn scan(&self, cluster: &str, name_filter: Option<&str>) -> DiscoveryResult<ScanReport> {
        let guard = CallGuard::new(self.cancel.clone(), self.timeout);
        guard.check()?;

        let pattern = StackNamePattern::new(&self.stack_prefix, cluster)
            .map_err(|e| DiscoveryError::Pattern(e.to_string()))?;
        let mut candidates = CandidateScan::new(self.provider.as_ref(), &guard, cluster, pattern, name_filter);
        let mut report = ScanReport::default();

        while let Some(candidate) = candidates.next_candidate().await? {
            match self.summarize(&guard, cluster, &candidate).await {
                Ok(Ok(summary)) => report.summaries.push(summary),
                Ok(Err(reason)) => {
                    warn!(
                        stack = %candidate.stack_name,
                        error = %reason,
                        "skipping stack with unclassifiable tags"
                    );
                    report.skipped.push(SkippedStack {
                        stack_name: candidate.stack_name,
                        reason,
                    });
                }
                Err(e) => {
                    candidates.abort();
                    warn!(
                        cluster = %cluster,
                        stack = %candidate.stack_name,
                        error = %e,
                        "nodegroup scan aborted"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            cluster = %cluster,
            pages = candidates.pages_fetched(),
            found = report.summaries.len(),
            skipped = report.skipped.len(),
            "nodegroup scan complete"
        );
        Ok(report)
    }

    /// Build one summary. The outer error is fatal for the scan; the inner
    /// one only excludes this candidate.
    async fn summarize(
        &self,
        guard: &CallGuard,
        cluster: &str,
        candidate: &Candidate,
    ) -> DiscoveryResult<Result<NodeGroupSummary, ClassifyError>> {
        let stack_name = candidate.stack_name.as_str();
        let record = guard.run(self.provider.describe_stack(stack_name)).await?;

        let classification = match tags::classify(&record.tags) {
            Ok(c) => c,
            Err(e) => return Ok(Err(e)),
        };
        if let Some(tagged) = &classification.cluster
            && tagged != cluster
        {
            debug!(stack = %stack_name, tagged = %tagged, "cluster tag disagrees with stack name");
        }
        let owner = classification.cluster.unwrap_or_else(|| cluster.to_string());

        let autoscaling_group_name = match guard
            .run(self.provider.describe_resource(stack_name, NODEGROUP_LOGICAL_ID))
            .await
        {
            Ok(resource) => Some(resource.physical_id),
            Err(e @ (DiscoveryError::Cancelled | DiscoveryError::TimedOut(_))) => return Err(e),
            Err(e) => {
                warn!(stack = %stack_name, error = %e, "autoscaling group lookup failed");
                None
            }
        };

        let template = guard.run(self.provider.get_template(stack_name)).await?;
        let capacity = match current_capacity(&template) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(stack = %stack_name, error = %e, "capacity not readable from template");
                None
            }
        };

        debug!(
            stack = %stack_name,
            nodegroup = %classification.name,
            kind = %classification.node_group_type,
            "summarized nodegroup stack"
        );

        Ok(Ok(NodeGroupSummary {
            node_instance_role_arn: record.output(INSTANCE_ROLE_ARN_OUTPUT).map(str::to_string),
            stack_name: record.name,
            stack_id: record.id,
            status: record.status,
            cluster: owner,
            name: classification.name,
            node_group_type: classification.node_group_type,
            capacity,
            autoscaling_group_name,
        }))
    }
}
