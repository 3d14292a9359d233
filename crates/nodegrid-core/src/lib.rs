//! nodegrid-core — shared model for node-group reconciliation.
//!
//! Holds the types every other nodegrid crate speaks in: node-group specs,
//! stack snapshots, and discovered summaries. Also owns the two conventions
//! that tie infrastructure back to node groups:
//!
//! - **Stack naming**: `<prefix>-<cluster>-nodegroup-<name>` ([`naming`])
//! - **Tagging**: current and legacy tag keys resolved through fixed
//!   priority tables ([`tags`])

pub mod config;
pub mod naming;
pub mod tags;
pub mod types;

pub use config::NodeGridConfig;
pub use naming::{StackNamePattern, nodegroup_stack_name};
pub use tags::{Classification, ClassifyError};
pub use types::*;
