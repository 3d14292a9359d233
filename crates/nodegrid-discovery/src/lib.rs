//! nodegrid-discovery — node-group discovery against a stack control plane.
//!
//! Walks a cluster's stack inventory page by page, picks out node-group
//! stacks by name, and builds a [`NodeGroupSummary`](nodegrid_core::NodeGroupSummary)
//! for each one. Also drives capacity changes through the reconciler.
//!
//! # Architecture
//!
//! ```text
//! StackSummaryAggregator
//!   ├── CandidateScan (lazy pages, local name match, abort)
//!   │   └── StackProvider::list_stack_names
//!   └── per candidate, in order
//!       ├── describe_stack      (failure aborts the scan)
//!       ├── tags::classify      (failure skips the candidate)
//!       ├── describe_resource   (failure leaves the ASG name empty)
//!       └── get_template        (failure aborts the scan)
//!
//! NodeGroupScaler
//!   ├── describe_stack + get_template
//!   ├── nodegrid_scale::reconcile
//!   └── StackUpdater::update_stack (only when the template changed)
//! ```
//!
//! Every collaborator call goes through a [`CallGuard`](guard::CallGuard),
//! which fails the call with `Cancelled` or `TimedOut` instead of waiting.
//! A failed scan never returns partial summaries.

pub mod aggregator;
pub mod error;
pub mod guard;
pub mod inventory;
pub mod provider;
pub mod scaler;
pub mod scan;

pub use aggregator::{ScanReport, SkippedStack, StackSummaryAggregator};
pub use error::{DiscoveryError, DiscoveryResult, ProviderError, ProviderResult};
pub use inventory::{Inventory, InventoryError, InventoryProvider, InventoryStack};
pub use provider::{StackPage, StackProvider, StackUpdater};
pub use scaler::NodeGroupScaler;
pub use scan::{Candidate, CandidateScan};
