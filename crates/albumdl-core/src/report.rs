//! Lifecycle events emitted by the batch orchestrator, and a line-based reporter.
//!
//! The orchestrator only knows the [`Reporter`] trait. Presentation lives in
//! implementations; [`LogReporter`] writes one `[Level] message` line per event
//! and mirrors the event into `tracing`.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

/// One observable step in a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Emitted once, before any dispatch.
    Queued { count: usize },
    /// Album already present; the downloader was not invoked.
    Skipped { key: String, identifier: String },
    /// The downloader is about to run.
    Started { key: String },
    Succeeded { key: String, duration: Duration },
    /// `subject` is the canonical key when resolution succeeded, the link otherwise.
    Failed { subject: String, reason: String },
    /// The link is not a resolvable album.
    Invalid { identifier: String },
    /// A transient failure will be retried after `delay`.
    Retrying {
        subject: String,
        attempt: u32,
        delay: Duration,
    },
    /// No further albums will be dispatched.
    Fatal { reason: String },
}

pub trait Reporter: Send + Sync {
    fn report(&self, event: &BatchEvent);
}

/// Severity tag printed in front of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Fatal => "Fatal",
        };
        write!(f, "[{}]", label)
    }
}

impl BatchEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            BatchEvent::Queued { .. }
            | BatchEvent::Skipped { .. }
            | BatchEvent::Started { .. }
            | BatchEvent::Succeeded { .. } => LogLevel::Info,
            BatchEvent::Failed { .. } | BatchEvent::Invalid { .. } | BatchEvent::Retrying { .. } => {
                LogLevel::Warn
            }
            BatchEvent::Fatal { .. } => LogLevel::Fatal,
        }
    }
}

impl fmt::Display for BatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchEvent::Queued { count } => write!(f, "Queued {} album(s)", count),
            BatchEvent::Skipped { key, identifier } => write!(
                f,
                "Ignoring {} as it has already been found within the directory. (From URL {})",
                key, identifier
            ),
            BatchEvent::Started { key } => write!(f, "Downloading {}", key),
            BatchEvent::Succeeded { key, duration } => write!(
                f,
                "Downloaded {} in {:.2} seconds.",
                key,
                duration.as_secs_f64()
            ),
            BatchEvent::Failed { subject, reason } => {
                write!(f, "Failed to download {}. Error: {}", subject, reason)
            }
            BatchEvent::Invalid { identifier } => write!(f, "Invalid album link: {}", identifier),
            BatchEvent::Retrying {
                subject,
                attempt,
                delay,
            } => write!(
                f,
                "Retrying {} in {:.1} seconds (attempt {})",
                subject,
                delay.as_secs_f64(),
                attempt
            ),
            BatchEvent::Fatal { reason } => write!(f, "{}; no further albums will be started", reason),
        }
    }
}

/// Writes `[Level] message` lines to any writer (stdout in the CLI).
pub struct LogReporter<W> {
    out: Mutex<W>,
}

impl LogReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Reporter for LogReporter<W> {
    fn report(&self, event: &BatchEvent) {
        let level = event.level();
        match level {
            LogLevel::Info => tracing::info!("{}", event),
            LogLevel::Warn => tracing::warn!("{}", event),
            LogLevel::Fatal => tracing::error!("{}", event),
        }

        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if writeln!(out, "{} {}", level, event).is_err() {
            tracing::debug!("reporter output closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_event() {
        let reporter = LogReporter::new(Vec::new());
        reporter.report(&BatchEvent::Queued { count: 2 });
        reporter.report(&BatchEvent::Started {
            key: "X - Y".to_string(),
        });
        reporter.report(&BatchEvent::Succeeded {
            key: "X - Y".to_string(),
            duration: Duration::from_millis(1500),
        });
        reporter.report(&BatchEvent::Invalid {
            identifier: "https://open.spotify.com/track/1".to_string(),
        });
        reporter.report(&BatchEvent::Fatal {
            reason: "credentials rejected".to_string(),
        });

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[Info] Queued 2 album(s)",
                "[Info] Downloading X - Y",
                "[Info] Downloaded X - Y in 1.50 seconds.",
                "[Warn] Invalid album link: https://open.spotify.com/track/1",
                "[Fatal] credentials rejected; no further albums will be started",
            ]
        );
    }

    #[test]
    fn skip_line_names_key_and_link() {
        let event = BatchEvent::Skipped {
            key: "X - Y".to_string(),
            identifier: "id-A".to_string(),
        };
        assert_eq!(event.level(), LogLevel::Info);
        let line = event.to_string();
        assert!(line.contains("X - Y"));
        assert!(line.contains("id-A"));
    }
}
