//! Lazy scan over a cluster's node-group stacks.
//!
//! Pages are requested one at a time, only once the previous page has been
//! consumed. Names that don't follow the cluster's node-group naming
//! convention are dropped locally, so no detail, template or resource call
//! is ever made for a stack outside the cluster's namespace.

use tracing::debug;

use nodegrid_core::StackNamePattern;

use crate::error::DiscoveryResult;
use crate::guard::CallGuard;
use crate::provider::StackProvider;

/// A stack whose name matches the cluster's node-group pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub stack_name: String,
    /// Node-group name as encoded in the stack name.
    pub nodegroup: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// More pages may follow.
    Scanning,
    /// The last page has been fetched.
    Exhausted,
    /// Stopped by the consumer or by a listing failure.
    Aborted,
}

/// Iterator over [`Candidate`]s, driven by [`CandidateScan::next_candidate`].
pub struct CandidateScan<'a, P> {
    provider: &'a P,
    guard: &'a CallGuard,
    cluster: String,
    pattern: StackNamePattern,
    name_filter: Option<String>,
    page: std::vec::IntoIter<String>,
    next_token: Option<String>,
    state: ScanState,
    pages: usize,
}

impl<'a, P: StackProvider> CandidateScan<'a, P> {
    pub fn new(
        provider: &'a P,
        guard: &'a CallGuard,
        cluster: &str,
        pattern: StackNamePattern,
        name_filter: Option<&str>,
    ) -> Self {
        Self {
            provider,
            guard,
            cluster: cluster.to_string(),
            pattern,
            name_filter: name_filter.map(str::to_string),
            page: Vec::new().into_iter(),
            next_token: None,
            state: ScanState::Scanning,
            pages: 0,
        }
    }

    /// Stop the scan. No further page is requested and
    /// [`next_candidate`](Self::next_candidate) returns `None` from now on.
    pub fn abort(&mut self) {
        self.state = ScanState::Aborted;
    }

    pub fn is_aborted(&self) -> bool {
        self.state == ScanState::Aborted
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Yield the next matching stack, fetching pages as needed.
    ///
    /// A listing failure aborts the scan and is returned as is.
    pub async fn next_candidate(&mut self) -> DiscoveryResult<Option<Candidate>> {
        loop {
            if self.state == ScanState::Aborted {
                return Ok(None);
            }

            while let Some(stack_name) = self.page.next() {
                if let Some(candidate) = self.match_name(stack_name) {
                    // Stack names are unique, so a filtered scan is done once
                    // its node group turns up.
                    if self.name_filter.is_some() {
                        self.state = ScanState::Exhausted;
                        self.page = Vec::new().into_iter();
                    }
                    return Ok(Some(candidate));
                }
            }

            if self.state == ScanState::Exhausted {
                return Ok(None);
            }

            if let Err(e) = self.fetch_page().await {
                self.abort();
                return Err(e);
            }
        }
    }

    async fn fetch_page(&mut self) -> DiscoveryResult<()> {
        let page = self
            .guard
            .run(
                self.provider
                    .list_stack_names(&self.cluster, self.next_token.as_deref()),
            )
            .await?;
        self.pages += 1;

        debug!(
            cluster = %self.cluster,
            page = self.pages,
            stacks = page.names.len(),
            more = page.next_token.is_some(),
            "fetched stack page"
        );

        if page.next_token.is_none() {
            self.state = ScanState::Exhausted;
        }
        self.next_token = page.next_token;
        self.page = page.names.into_iter();
        Ok(())
    }

    fn match_name(&self, stack_name: String) -> Option<Candidate> {
        let nodegroup = self.pattern.nodegroup_name(&stack_name)?;
        if let Some(filter) = &self.name_filter
            && filter != nodegroup
        {
            return None;
        }
        let nodegroup = nodegroup.to_string();
        Some(Candidate {
            stack_name,
            nodegroup,
        })
    }
}
