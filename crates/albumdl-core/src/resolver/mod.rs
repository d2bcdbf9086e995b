//! Resolver: turns a raw album link into a [`ResolvedTask`] with a canonical key.
//!
//! The resolver owns nothing but its lookup collaborator; credentials and any
//! other configuration live in that collaborator and are passed in at
//! construction.

mod key;

pub use key::{canonical_key, sanitize_key};

use std::sync::Arc;

use crate::lookup::{LookupError, MetadataLookup};

/// An album link paired with the key its download lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    pub identifier: String,
    pub canonical_key: String,
}

/// Why an identifier could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Not an album link, or no such album. A per-task warning.
    #[error("invalid album link")]
    InvalidIdentifier,
    /// Any other lookup failure; the cause is kept for reporting.
    #[error("metadata lookup failed: {0}")]
    LookupFailed(LookupError),
}

impl ResolutionError {
    /// True when every later lookup would fail the same way (rejected credentials).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolutionError::LookupFailed(LookupError::Unauthorized))
    }
}

impl From<LookupError> for ResolutionError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::NotAlbum | LookupError::NotFound => ResolutionError::InvalidIdentifier,
            other => ResolutionError::LookupFailed(other),
        }
    }
}

#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn MetadataLookup>,
}

impl Resolver {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self { lookup }
    }

    /// Resolves one identifier. Makes exactly one lookup call unless the
    /// identifier is blank.
    pub fn resolve(&self, identifier: &str) -> Result<ResolvedTask, ResolutionError> {
        if identifier.trim().is_empty() {
            return Err(ResolutionError::InvalidIdentifier);
        }
        let meta = self.lookup.lookup(identifier)?;
        Ok(ResolvedTask {
            identifier: identifier.to_string(),
            canonical_key: canonical_key(&meta.title, &meta.primary_artist),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::AlbumMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OneAlbum {
        calls: AtomicUsize,
    }

    impl MetadataLookup for OneAlbum {
        fn lookup(&self, identifier: &str) -> Result<AlbumMetadata, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match identifier {
                "album" => Ok(AlbumMetadata {
                    title: "Homework".to_string(),
                    primary_artist: "Daft Punk".to_string(),
                }),
                "track" => Err(LookupError::NotAlbum),
                "gone" => Err(LookupError::NotFound),
                "locked" => Err(LookupError::Unauthorized),
                _ => Err(LookupError::Transport("connection reset".to_string())),
            }
        }
    }

    fn resolver() -> (Resolver, Arc<OneAlbum>) {
        let lookup = Arc::new(OneAlbum {
            calls: AtomicUsize::new(0),
        });
        (Resolver::new(lookup.clone()), lookup)
    }

    #[test]
    fn resolves_to_title_dash_artist() {
        let (r, _) = resolver();
        let task = r.resolve("album").unwrap();
        assert_eq!(task.identifier, "album");
        assert_eq!(task.canonical_key, "Homework - Daft Punk");
    }

    #[test]
    fn resolution_is_deterministic_and_uncached() {
        let (r, lookup) = resolver();
        let a = r.resolve("album").unwrap();
        let b = r.resolve("album").unwrap();
        assert_eq!(a.canonical_key, b.canonical_key);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn blank_identifier_skips_lookup() {
        let (r, lookup) = resolver();
        assert_eq!(r.resolve("  "), Err(ResolutionError::InvalidIdentifier));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn not_album_and_not_found_are_invalid() {
        let (r, _) = resolver();
        assert_eq!(r.resolve("track"), Err(ResolutionError::InvalidIdentifier));
        assert_eq!(r.resolve("gone"), Err(ResolutionError::InvalidIdentifier));
    }

    #[test]
    fn other_failures_keep_cause() {
        let (r, _) = resolver();
        let err = r.resolve("flaky").unwrap_err();
        assert_eq!(
            err,
            ResolutionError::LookupFailed(LookupError::Transport("connection reset".to_string()))
        );
        assert!(!err.is_fatal());
        assert!(r.resolve("locked").unwrap_err().is_fatal());
    }
}
