//! Metadata lookup: turns an album link into title and primary artist.
//!
//! The resolver only depends on the [`MetadataLookup`] trait; the Spotify
//! Web API client in [`spotify`] is the production implementation.

pub mod spotify;

pub use spotify::SpotifyClient;

/// Album metadata needed to build a canonical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumMetadata {
    pub title: String,
    pub primary_artist: String,
}

/// Why a lookup failed. Callers branch on the variant, never on the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The link does not name an album (a track, a playlist, not a catalog link at all).
    #[error("not an album link")]
    NotAlbum,
    /// The catalog has no album with this id.
    #[error("album not found")]
    NotFound,
    /// Credentials were rejected; every further lookup will fail the same way.
    #[error("credentials rejected by the metadata service")]
    Unauthorized,
    /// Rate limited (HTTP 429).
    #[error("rate limited by the metadata service")]
    Throttled,
    /// Network failure, timeout or server error.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Source of album metadata. Implementations may block (network I/O); the
/// batch orchestrator calls them from the blocking thread pool.
pub trait MetadataLookup: Send + Sync {
    fn lookup(&self, identifier: &str) -> Result<AlbumMetadata, LookupError>;
}
