//! One album's pipeline: resolve, check completion, execute.
//!
//! Every error is converted into a [`TaskOutcome`] here; nothing propagates
//! to the dispatch loop.

use std::sync::Arc;

use crate::executor::{ExecutionError, ExecutionRecord, TaskExecutor};
use crate::oracle::CompletionOracle;
use crate::report::{BatchEvent, Reporter};
use crate::resolver::{ResolutionError, ResolvedTask, Resolver};
use crate::retry::{self, RetryDecision, RetryPolicy};

use super::abort::AbortSignal;
use super::outcome::{FailureReason, TaskOutcome};

/// Collaborators shared by all tasks of one batch.
pub(super) struct TaskContext {
    pub(super) resolver: Resolver,
    pub(super) oracle: Arc<dyn CompletionOracle>,
    pub(super) executor: Arc<dyn TaskExecutor>,
    pub(super) reporter: Arc<dyn Reporter>,
    pub(super) retry: RetryPolicy,
    pub(super) abort: AbortSignal,
}

impl TaskContext {
    /// Raise the abort signal; only the first raiser reports it.
    fn escalate(&self, reason: String) {
        if self.abort.raise(reason.clone()) {
            tracing::error!("fatal batch condition: {}", reason);
            self.reporter.report(&BatchEvent::Fatal { reason });
        }
    }

    fn report(&self, event: BatchEvent) {
        self.reporter.report(&event);
    }

    /// Sleep before another attempt, unless the batch is stopping.
    async fn backoff(&self, subject: &str, attempt: u32, decision: RetryDecision) -> bool {
        let RetryDecision::RetryAfter(delay) = decision else {
            return false;
        };
        if self.abort.is_raised() {
            return false;
        }
        self.report(BatchEvent::Retrying {
            subject: subject.to_string(),
            attempt: attempt + 1,
            delay,
        });
        tokio::time::sleep(delay).await;
        true
    }
}

pub(super) async fn run_task(ctx: Arc<TaskContext>, identifier: String) -> TaskOutcome {
    let task = match resolve_stage(&ctx, &identifier).await {
        Ok(task) => task,
        Err(outcome) => return outcome,
    };
    let key = task.canonical_key.clone();

    if ctx.oracle.already_complete(&key) {
        tracing::debug!(key = %key, "already complete, skipping");
        ctx.report(BatchEvent::Skipped {
            key: key.clone(),
            identifier,
        });
        return TaskOutcome::Skipped { key };
    }

    ctx.report(BatchEvent::Started { key: key.clone() });
    match execute_stage(&ctx, task).await {
        Ok(record) => {
            if let Err(e) = ctx.oracle.mark_complete(&key) {
                tracing::warn!(key = %key, "could not write completion marker: {}", e);
            }
            ctx.report(BatchEvent::Succeeded {
                key: key.clone(),
                duration: record.duration,
            });
            TaskOutcome::Succeeded {
                key,
                duration: record.duration,
            }
        }
        Err(reason) => {
            ctx.report(BatchEvent::Failed {
                subject: key.clone(),
                reason: reason.to_string(),
            });
            TaskOutcome::Failed {
                key: Some(key),
                reason,
            }
        }
    }
}

/// Resolve on the blocking pool, retrying transient lookup failures per policy.
async fn resolve_stage(ctx: &Arc<TaskContext>, identifier: &str) -> Result<ResolvedTask, TaskOutcome> {
    let mut attempt = 1u32;
    loop {
        let resolver = ctx.resolver.clone();
        let id = identifier.to_string();
        let result = tokio::task::spawn_blocking(move || resolver.resolve(&id)).await;

        let err = match result {
            Ok(Ok(task)) => return Ok(task),
            Ok(Err(err)) => err,
            Err(join) => {
                let reason = FailureReason::Internal(format!("lookup task: {}", join));
                ctx.report(BatchEvent::Failed {
                    subject: identifier.to_string(),
                    reason: reason.to_string(),
                });
                return Err(TaskOutcome::Failed { key: None, reason });
            }
        };

        let decision = ctx.retry.decide(attempt, retry::classify_resolution(&err));
        if ctx.backoff(identifier, attempt, decision).await {
            attempt += 1;
            continue;
        }

        let fatal = err.is_fatal();
        return Err(match err {
            ResolutionError::InvalidIdentifier => {
                ctx.report(BatchEvent::Invalid {
                    identifier: identifier.to_string(),
                });
                TaskOutcome::Invalid
            }
            ResolutionError::LookupFailed(cause) => {
                let reason = FailureReason::Lookup(cause);
                ctx.report(BatchEvent::Failed {
                    subject: identifier.to_string(),
                    reason: reason.to_string(),
                });
                if fatal {
                    ctx.escalate(reason.to_string());
                }
                TaskOutcome::Failed { key: None, reason }
            }
        });
    }
}

/// Run the executor in its own task so a panic stays contained, retrying per policy.
async fn execute_stage(ctx: &Arc<TaskContext>, task: ResolvedTask) -> Result<ExecutionRecord, FailureReason> {
    let mut attempt = 1u32;
    loop {
        let executor = Arc::clone(&ctx.executor);
        let attempt_task = task.clone();
        let result = tokio::spawn(async move { executor.execute(&attempt_task).await }).await;

        let err: ExecutionError = match result {
            Ok(Ok(record)) => return Ok(record),
            Ok(Err(err)) => err,
            Err(join) => return Err(FailureReason::Internal(format!("downloader task: {}", join))),
        };

        if err.is_fatal() {
            ctx.escalate(err.to_string());
            return Err(FailureReason::Execution(err.to_string()));
        }

        let decision = ctx.retry.decide(attempt, retry::classify_execution(&err));
        if ctx.backoff(&task.canonical_key, attempt, decision).await {
            attempt += 1;
            continue;
        }
        return Err(FailureReason::Execution(err.to_string()));
    }
}
