//! Map resolution and execution errors to retry error kinds.

use crate::executor::ExecutionError;
use crate::lookup::LookupError;
use crate::resolver::ResolutionError;
use crate::retry::policy::ErrorKind;

/// Classify a resolution failure. Invalid links and rejected credentials are never retried.
pub fn classify_resolution(e: &ResolutionError) -> ErrorKind {
    match e {
        ResolutionError::InvalidIdentifier => ErrorKind::Other,
        ResolutionError::LookupFailed(cause) => match cause {
            LookupError::Throttled => ErrorKind::Throttled,
            LookupError::Transport(_) => ErrorKind::Connection,
            LookupError::NotAlbum
            | LookupError::NotFound
            | LookupError::Unauthorized
            | LookupError::Malformed(_) => ErrorKind::Other,
        },
    }
}

/// Classify a downloader failure. Launch failures are never retried.
pub fn classify_execution(e: &ExecutionError) -> ErrorKind {
    match e {
        ExecutionError::Launch { .. } => ErrorKind::Other,
        ExecutionError::NonZeroExit { .. } => ErrorKind::ProcessFailed,
        ExecutionError::TimedOut(_) => ErrorKind::Timeout,
    }
}
