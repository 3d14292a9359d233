//! Discovery and collaborator error types.

use std::time::Duration;

use thiserror::Error;

use nodegrid_scale::ReconcileError;

/// Failures reported by the stack control plane.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("stack {0} does not exist")]
    StackNotFound(String),

    #[error("resource {logical_id} not found in stack {stack}")]
    ResourceNotFound { stack: String, logical_id: String },

    #[error("{operation} failed: {message}")]
    Request { operation: String, message: String },
}

impl ProviderError {
    pub fn request(operation: &str, message: impl Into<String>) -> Self {
        ProviderError::Request {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that end a discovery scan or a scaling request.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("invalid stack name pattern: {0}")]
    Pattern(String),

    #[error("discovery cancelled")]
    Cancelled,

    #[error("discovery timed out after {0:?}")]
    TimedOut(Duration),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
