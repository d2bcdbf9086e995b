//! Runs the external downloader (`spotdl` by default) as a child process.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::{ExecutionError, ExecutionRecord, TaskExecutor};
use crate::config::AlbumdlConfig;
use crate::resolver::ResolvedTask;

/// Invokes `<program> <link> <args...> --output <output_root>/<key>`.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    program: String,
    args: Vec<String>,
    output_root: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<String>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            output_root: output_root.into(),
            timeout: None,
        }
    }

    pub fn from_config(cfg: &AlbumdlConfig, output_root: impl Into<PathBuf>) -> Self {
        Self::new(cfg.downloader.program.clone(), output_root)
            .with_args(cfg.downloader.args.clone())
            .with_timeout(cfg.downloader_timeout())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, task: &ResolvedTask) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(&task.identifier)
            .args(&self.args)
            .arg("--output")
            .arg(self.output_root.join(&task.canonical_key))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TaskExecutor for ProcessExecutor {
    async fn execute(&self, task: &ResolvedTask) -> Result<ExecutionRecord, ExecutionError> {
        let start = Instant::now();
        let output = self.command(task).output();

        // Dropping the `output` future on timeout kills the child (kill_on_drop).
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(res) => res,
                Err(_) => {
                    tracing::warn!(key = %task.canonical_key, "downloader timed out after {:?}", limit);
                    return Err(ExecutionError::TimedOut(limit));
                }
            },
            None => output.await,
        }
        .map_err(|source| ExecutionError::Launch {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            tracing::debug!(key = %task.canonical_key, "{}", line.trim());
        }

        if !output.status.success() {
            return Err(ExecutionError::NonZeroExit {
                code: output.status.code(),
                stderr_tail: last_line(&output.stderr),
            });
        }

        Ok(ExecutionRecord {
            duration: start.elapsed(),
        })
    }
}

/// Last non-empty line of process output, lossily decoded.
fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}
