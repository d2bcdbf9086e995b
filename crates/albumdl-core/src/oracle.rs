//! Completion oracle: has an album already been downloaded?
//!
//! Existence-based by default: a directory named after the canonical key under
//! the output root means "done". A half-finished download looks the same as a
//! finished one unless a completion marker is configured.

use std::io;
use std::path::{Path, PathBuf};

pub trait CompletionOracle: Send + Sync {
    /// Side-effect-free check; true means the album is skipped.
    fn already_complete(&self, canonical_key: &str) -> bool;

    /// Record a successful download. No-op for existence-only oracles.
    fn mark_complete(&self, _canonical_key: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Checks `<root>/<key>` (or `<root>/<key>/<marker>` when a marker is set).
#[derive(Debug, Clone)]
pub struct DirectoryOracle {
    root: PathBuf,
    marker: Option<String>,
}

impl DirectoryOracle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            marker: None,
        }
    }

    /// Require `<root>/<key>/<marker>` instead of just the directory.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, canonical_key: &str) -> PathBuf {
        let dir = self.root.join(canonical_key);
        match &self.marker {
            Some(marker) => dir.join(marker),
            None => dir,
        }
    }
}

impl CompletionOracle for DirectoryOracle {
    fn already_complete(&self, canonical_key: &str) -> bool {
        self.entry(canonical_key).exists()
    }

    fn mark_complete(&self, canonical_key: &str) -> io::Result<()> {
        let Some(marker) = &self.marker else {
            return Ok(());
        };
        let dir = self.root.join(canonical_key);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(marker), b"")
    }
}
