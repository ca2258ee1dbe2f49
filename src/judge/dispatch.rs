// src/judge/dispatch.rs
//! Bounded-concurrency batch dispatch.
//!
//! Batches are independent: each one either yields its verdicts or a `JudgeError`.
//! Results come back in batch order regardless of completion order. A batch that runs
//! past its own timeout or past the shared run deadline counts as a `Timeout` failure.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use super::JudgeError;

#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Max batches in flight.
    pub concurrency: usize,
    /// Upper bound for a single batch.
    pub batch_timeout: Duration,
    /// Run-level deadline shared by every judge layer of one run.
    pub deadline: Option<Instant>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            batch_timeout: Duration::from_secs(45),
            deadline: None,
        }
    }
}

impl DispatchOptions {
    /// Earliest of the batch timeout and the run deadline. `None` when neither is
    /// representable as an instant.
    fn cutoff(&self) -> Option<Instant> {
        let own = Instant::now().checked_add(self.batch_timeout);
        match (own, self.deadline) {
            (Some(o), Some(d)) => Some(o.min(d)),
            (o, d) => o.or(d),
        }
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Run `call` over every batch, at most `opts.concurrency` at a time.
/// `call` receives the batch index and the batch.
pub async fn dispatch_batches<B, T, F, Fut>(
    batches: Vec<B>,
    opts: &DispatchOptions,
    call: F,
) -> Vec<Result<T, JudgeError>>
where
    F: Fn(usize, B) -> Fut,
    Fut: Future<Output = Result<T, JudgeError>>,
{
    let call = &call;
    stream::iter(batches.into_iter().enumerate())
        .map(|(idx, batch)| async move {
            let res = if opts.deadline_passed() {
                Err(JudgeError::Timeout)
            } else {
                match opts.cutoff() {
                    Some(cutoff) => tokio::time::timeout_at(cutoff, call(idx, batch))
                        .await
                        .unwrap_or(Err(JudgeError::Timeout)),
                    None => call(idx, batch).await,
                }
            };
            if let Err(e) = &res {
                warn!(target: "judge", batch = idx, error = %e, "judge batch failed");
            }
            res
        })
        .buffered(opts.concurrency.max(1))
        .collect()
        .await
}
