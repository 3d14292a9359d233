//! Reconciler error types.

use thiserror::Error;

/// Desired capacity outside the group's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsViolation {
    #[error("the desired nodes {desired} is greater than the nodes-max/maxSize {max}")]
    AboveMax { desired: u32, max: u32 },

    #[error("the desired nodes {desired} is less than the nodes-min/minSize {min}")]
    BelowMin { desired: u32, min: u32 },
}

/// Errors that can occur while reconciling a scaling template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("unexpected nodegroup template: {0}")]
    Parse(String),

    #[error(transparent)]
    OutOfBounds(#[from] BoundsViolation),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
