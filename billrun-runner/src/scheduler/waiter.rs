//! Request waiter
//!
//! Polls the status store until a billing request reaches a terminal status
//! or its deadline passes. The deadline is fixed once when the wait starts;
//! the interval between polls is constant.

use billrun_core::{JobId, WaitOutcome, resolve_terminal};
use billrun_store::{StatusStore, StoreError};
use std::sync::Arc;
use tokio::time::{self, Duration, Instant};
use tracing::{error, info, warn};

/// How a single wait went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitReport {
    pub outcome: WaitOutcome,
    /// Number of status queries issued
    pub polls: u32,
    pub elapsed: Duration,
}

/// Waits on billing requests against a shared status store
pub struct Waiter {
    store: Arc<dyn StatusStore>,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(store: Arc<dyn StatusStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Waits until `id` is terminal or `timeout` elapses
    pub async fn wait(&self, id: &JobId, timeout: Duration) -> Result<WaitReport, StoreError> {
        self.wait_then(id, timeout, || {}).await
    }

    /// Like [`Waiter::wait`], calling `on_success` once if the request succeeds
    ///
    /// A store error ends the wait immediately; it is never read as
    /// "still running".
    pub async fn wait_then<F>(
        &self,
        id: &JobId,
        timeout: Duration,
        on_success: F,
    ) -> Result<WaitReport, StoreError>
    where
        F: FnOnce(),
    {
        let started = Instant::now();
        // A timeout past what the clock can represent never expires
        let deadline = started.checked_add(timeout);
        let mut polls = 0;

        let report = |outcome, polls| WaitReport {
            outcome,
            polls,
            elapsed: started.elapsed(),
        };

        while deadline.is_none_or(|deadline| Instant::now() < deadline) {
            let rows = self.store.fetch_status(id).await?;
            polls += 1;

            if let Some((row, outcome)) = resolve_terminal(&rows) {
                if outcome.is_success() {
                    info!("{} {} Completed without errors", row.name, id);
                    on_success();
                } else {
                    error!("{} {} Completed with errors", row.name, id);
                }
                return Ok(report(outcome, polls));
            }

            info!("Waiting on {}", id);
            time::sleep(self.poll_interval).await;
        }

        warn!("Timed out while waiting for request {}", id);
        Ok(report(WaitOutcome::TimedOut, polls))
    }
}
