//! Per-album outcomes and the aggregated batch report.

use std::fmt;
use std::time::Duration;

use crate::lookup::LookupError;

/// Why an album failed after its link was accepted as plausible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Metadata lookup failed for a reason other than "not an album".
    Lookup(LookupError),
    /// The downloader could not be started, exited non-zero or timed out.
    Execution(String),
    /// A collaborator panicked; contained to this album.
    Internal(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Lookup(e) => write!(f, "metadata lookup failed: {}", e),
            FailureReason::Execution(msg) => write!(f, "{}", msg),
            FailureReason::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

/// Terminal state of one submitted link. Written exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Already downloaded; the downloader was not run.
    Skipped { key: String },
    Succeeded { key: String, duration: Duration },
    /// Not an album link, or the album does not exist.
    Invalid,
    /// `key` is None when resolution itself failed.
    Failed {
        key: Option<String>,
        reason: FailureReason,
    },
    /// Never started because a fatal condition stopped dispatch.
    Aborted,
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            TaskOutcome::Invalid | TaskOutcome::Failed { .. } | TaskOutcome::Aborted
        )
    }
}

/// Counts per terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub succeeded: usize,
    pub skipped: usize,
    pub invalid: usize,
    pub lookup_failed: usize,
    /// Downloader failures plus contained internal errors.
    pub execution_failed: usize,
    pub aborted: usize,
}

impl BatchCounts {
    fn tally<'a>(outcomes: impl Iterator<Item = &'a TaskOutcome>) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Skipped { .. } => counts.skipped += 1,
                TaskOutcome::Succeeded { .. } => counts.succeeded += 1,
                TaskOutcome::Invalid => counts.invalid += 1,
                TaskOutcome::Failed {
                    reason: FailureReason::Lookup(_),
                    ..
                } => counts.lookup_failed += 1,
                TaskOutcome::Failed { .. } => counts.execution_failed += 1,
                TaskOutcome::Aborted => counts.aborted += 1,
            }
        }
        counts
    }
}

/// Result of one batch run, built once after every album reached a terminal state.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// (link, outcome) in input order.
    outcomes: Vec<(String, TaskOutcome)>,
    counts: BatchCounts,
    elapsed: Duration,
    fatal: Option<String>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<(String, TaskOutcome)>, elapsed: Duration, fatal: Option<String>) -> Self {
        let counts = BatchCounts::tally(outcomes.iter().map(|(_, o)| o));
        Self {
            outcomes,
            counts,
            elapsed,
            fatal,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn counts(&self) -> BatchCounts {
        self.counts
    }

    pub fn outcomes(&self) -> &[(String, TaskOutcome)] {
        &self.outcomes
    }

    /// Wall-clock time of the whole batch, not the sum of album durations.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reason dispatch was stopped early, if it was.
    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    pub fn has_failures(&self) -> bool {
        self.fatal.is_some() || self.outcomes.iter().any(|(_, o)| o.is_failure())
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        write!(
            f,
            "Processed {} album(s) in {:.2} seconds: {} downloaded, {} skipped, {} invalid, {} failed",
            self.total(),
            self.elapsed.as_secs_f64(),
            c.succeeded,
            c.skipped,
            c.invalid,
            c.lookup_failed + c.execution_failed,
        )?;
        if c.aborted > 0 {
            write!(f, ", {} not started", c.aborted)?;
        }
        if let Some(reason) = &self.fatal {
            write!(f, " (stopped early: {})", reason)?;
        }
        Ok(())
    }
}
