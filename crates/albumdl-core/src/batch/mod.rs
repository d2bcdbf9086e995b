//! Batch orchestrator.
//!
//! Each submitted link moves through
//! `Queued -> Resolving -> {Skipped | ResolutionFailed | Executing}` and
//! `Executing -> {Succeeded | ExecutionFailed}`, or ends `Aborted` if a fatal
//! condition stopped dispatch before it started. Links are processed on a
//! bounded pool; one album's failure never affects another's outcome.

mod abort;
mod outcome;
mod run;
mod task;

pub use abort::AbortSignal;
pub use outcome::{BatchCounts, BatchReport, FailureReason, TaskOutcome};
pub use run::{BatchRunner, DEFAULT_CONCURRENCY};
