//! Retry and backoff policy for whole albums.
//!
//! The batch orchestrator owns retries; collaborators (lookup, executor)
//! never retry on their own. Errors are classified into generic kinds so the
//! same policy covers both the resolution and the download stage.

mod classify;
mod policy;

pub use classify::{classify_execution, classify_resolution};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
