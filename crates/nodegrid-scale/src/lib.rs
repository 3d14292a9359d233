//! nodegrid-scale — capacity reconciliation for node-group stacks.
//!
//! Takes the current template of a node-group stack and a
//! [`NodeGroupSpec`](nodegrid_core::NodeGroupSpec), and decides whether the
//! autoscaling group's capacity has to change.
//!
//! # Reconcile Algorithm
//!
//! ```text
//! (D0, N0, X0) = DesiredCapacity, MinSize, MaxSize from template
//! (D, N, X)    = spec value if set, else current value
//!
//! if D > X: error AboveMax(D, X)
//! if D < N: error BelowMin(D, N)
//!
//! if (D, N, X) == (D0, N0, X0):
//!     Unchanged
//! else:
//!     Updated(template with only those three values rewritten)
//! ```
//!
//! Bounds are checked even when nothing changes, so a stack that is already
//! inconsistent is reported rather than silently accepted.
//!
//! The updated template is produced by splicing the three values into the
//! original text at their byte spans. Nothing is re-serialized, so key order,
//! whitespace and unrelated resources come out exactly as they went in.

pub mod error;
pub mod reconciler;
pub mod template;

pub use error::{BoundsViolation, ReconcileError};
pub use reconciler::{ReconcileOutcome, current_capacity, effective_capacity, reconcile, validate_bounds};
pub use template::CapacityFields;
