//! Cancellation and deadline checks around collaborator calls.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{DiscoveryError, DiscoveryResult, ProviderResult};

/// Races each collaborator call against a cancel signal and a deadline.
///
/// The deadline is fixed when the guard is created, so it bounds the whole
/// operation rather than each call.
#[derive(Debug, Clone)]
pub struct CallGuard {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<(Instant, Duration)>,
}

impl CallGuard {
    /// A timeout too large to express as an instant imposes no deadline.
    pub fn new(cancel: Option<watch::Receiver<bool>>, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: timeout.and_then(|t| Some((Instant::now().checked_add(t)?, t))),
        }
    }

    /// A guard that never cancels.
    pub fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Fail fast if the operation was already cancelled or is past its deadline.
    pub fn check(&self) -> DiscoveryResult<()> {
        if let Some(rx) = &self.cancel
            && *rx.borrow()
        {
            return Err(DiscoveryError::Cancelled);
        }
        if let Some((deadline, timeout)) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(DiscoveryError::TimedOut(timeout));
        }
        Ok(())
    }

    /// Run one collaborator call under the guard.
    pub async fn run<T>(&self, call: impl Future<Output = ProviderResult<T>>) -> DiscoveryResult<T> {
        self.check()?;

        tokio::select! {
            biased;
            _ = wait_cancelled(self.cancel.clone()) => Err(DiscoveryError::Cancelled),
            timeout = wait_deadline(self.deadline) => Err(DiscoveryError::TimedOut(timeout)),
            res = call => res.map_err(DiscoveryError::from),
        }
    }
}

async fn wait_cancelled(cancel: Option<watch::Receiver<bool>>) {
    let cancelled = match cancel {
        Some(mut rx) => rx.wait_for(|c| *c).await.is_ok(),
        None => false,
    };
    // A dropped sender can no longer cancel.
    if !cancelled {
        std::future::pending::<()>().await;
    }
}

async fn wait_deadline(deadline: Option<(Instant, Duration)>) -> Duration {
    match deadline {
        Some((at, timeout)) => {
            tokio::time::sleep_until(at).await;
            timeout
        }
        None => std::future::pending().await,
    }
}
