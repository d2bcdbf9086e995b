//! Task executor: performs the download for one resolved album.

mod process;

pub use process::ProcessExecutor;

use async_trait::async_trait;
use std::time::Duration;

use crate::resolver::ResolvedTask;

/// What a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub duration: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The downloader could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The downloader ran and exited unsuccessfully (`code` is None when killed by a signal).
    #[error("downloader exited with {}", describe_exit(.code, .stderr_tail))]
    NonZeroExit { code: Option<i32>, stderr_tail: String },
    /// The downloader was killed after exceeding the per-task timeout.
    #[error("downloader timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl ExecutionError {
    /// True when every later task would fail the same way (downloader not installed).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExecutionError::Launch { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

fn describe_exit(code: &Option<i32>, stderr_tail: &str) -> String {
    let status = match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    };
    if stderr_tail.is_empty() {
        status
    } else {
        format!("{}: {}", status, stderr_tail)
    }
}

/// Runs the actual download. Must not retry internally; the orchestrator owns retries.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &ResolvedTask) -> Result<ExecutionRecord, ExecutionError>;
}
