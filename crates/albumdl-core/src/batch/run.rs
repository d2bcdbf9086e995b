//! Bounded fan-out over the album list.
//!
//! Keeps up to `concurrency` albums in flight; when one finishes, the next
//! queued link is started until the list is exhausted or the abort signal is
//! raised.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::executor::TaskExecutor;
use crate::oracle::CompletionOracle;
use crate::report::{BatchEvent, Reporter};
use crate::resolver::Resolver;
use crate::retry::RetryPolicy;

use super::abort::AbortSignal;
use super::outcome::{BatchReport, FailureReason, TaskOutcome};
use super::task::{run_task, TaskContext};

/// Default number of albums in flight.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Runs batches of album links through resolve → completion check → download.
pub struct BatchRunner {
    resolver: Resolver,
    oracle: Arc<dyn CompletionOracle>,
    executor: Arc<dyn TaskExecutor>,
    reporter: Arc<dyn Reporter>,
    retry: RetryPolicy,
    abort: AbortSignal,
}

impl BatchRunner {
    pub fn new(
        resolver: Resolver,
        oracle: Arc<dyn CompletionOracle>,
        executor: Arc<dyn TaskExecutor>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            resolver,
            oracle,
            executor,
            reporter,
            retry: RetryPolicy::single_attempt(),
            abort: AbortSignal::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Use an externally owned signal (e.g. raised by a Ctrl-C handler).
    pub fn with_abort_signal(mut self, abort: AbortSignal) -> Self {
        self.abort = abort;
        self
    }

    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Runs every link to a terminal outcome with at most `concurrency` in flight.
    ///
    /// One outcome per link, in input order. Per-album failures never stop
    /// the batch; a fatal condition stops dispatch and the links not yet
    /// started are reported as [`TaskOutcome::Aborted`].
    pub async fn run_batch(&self, identifiers: &[String], concurrency: usize) -> BatchReport {
        let concurrency = concurrency.max(1);
        let total = identifiers.len();
        let start = Instant::now();

        let ctx = Arc::new(TaskContext {
            resolver: self.resolver.clone(),
            oracle: Arc::clone(&self.oracle),
            executor: Arc::clone(&self.executor),
            reporter: Arc::clone(&self.reporter),
            retry: self.retry,
            abort: self.abort.clone(),
        });

        tracing::info!(total, concurrency, "batch started");
        report_contained(self.reporter.as_ref(), &BatchEvent::Queued { count: total });

        let mut slots: Vec<Option<TaskOutcome>> = (0..total).map(|_| None).collect();
        let mut next = 0usize;
        let mut join_set = tokio::task::JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, usize> = HashMap::new();

        loop {
            while join_set.len() < concurrency && next < total {
                if self.abort.is_raised() {
                    break;
                }
                let index = next;
                next += 1;
                let ctx = Arc::clone(&ctx);
                let identifier = identifiers[index].clone();
                let handle = join_set.spawn(async move { (index, run_task(ctx, identifier).await) });
                in_flight.insert(handle.id(), index);
            }

            if join_set.is_empty() {
                break;
            }

            let Some(res) = join_set.join_next().await else {
                break;
            };
            let (index, outcome) = match res {
                Ok(done) => done,
                // A collaborator outside the contained download stage panicked.
                Err(e) => {
                    tracing::error!("album task join: {}", e);
                    let Some(&index) = in_flight.get(&e.id()) else {
                        continue;
                    };
                    let reason = FailureReason::Internal(format!("album task: {}", e));
                    report_contained(
                        self.reporter.as_ref(),
                        &BatchEvent::Failed {
                            subject: identifiers[index].clone(),
                            reason: reason.to_string(),
                        },
                    );
                    (index, TaskOutcome::Failed { key: None, reason })
                }
            };
            debug_assert!(slots[index].is_none(), "outcome written twice");
            slots[index] = Some(outcome);
        }

        let outcomes = identifiers
            .iter()
            .cloned()
            .zip(slots)
            .enumerate()
            .map(|(index, (identifier, slot))| {
                let outcome = match slot {
                    Some(outcome) => outcome,
                    None if index >= next => TaskOutcome::Aborted,
                    None => TaskOutcome::Failed {
                        key: None,
                        reason: FailureReason::Internal("album task did not complete".to_string()),
                    },
                };
                (identifier, outcome)
            })
            .collect();

        let report = BatchReport::new(outcomes, start.elapsed(), self.abort.reason());
        tracing::info!(
            total,
            elapsed_secs = report.elapsed().as_secs_f64(),
            "batch finished: {:?}",
            report.counts()
        );
        report
    }
}

/// Deliver an event from the dispatch loop; a panicking reporter must not take the batch down.
fn report_contained(reporter: &dyn Reporter, event: &BatchEvent) {
    let delivered = std::panic::catch_unwind(AssertUnwindSafe(|| reporter.report(event)));
    if delivered.is_err() {
        tracing::error!("reporter panicked on event: {:?}", event);
    }
}
