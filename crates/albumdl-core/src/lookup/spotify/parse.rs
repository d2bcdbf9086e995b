//! Parse Spotify Web API JSON bodies.

use serde::Deserialize;
use std::time::Duration;

use crate::lookup::{AlbumMetadata, LookupError};

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AlbumBody {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistBody>,
}

#[derive(Debug, Deserialize)]
struct ArtistBody {
    name: String,
}

/// Default lifetime when the token response omits `expires_in` (Spotify issues 1h tokens).
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Parse a client-credentials token response into (token, lifetime).
pub(crate) fn parse_token(body: &[u8]) -> Result<(String, Duration), LookupError> {
    let token: TokenBody =
        serde_json::from_slice(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    if token.access_token.is_empty() {
        return Err(LookupError::Malformed("empty access_token".to_string()));
    }
    let ttl = token
        .expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TOKEN_TTL);
    Ok((token.access_token, ttl))
}

/// Parse an album object; the first listed artist is the primary one.
pub(crate) fn parse_album(body: &[u8]) -> Result<AlbumMetadata, LookupError> {
    let album: AlbumBody =
        serde_json::from_slice(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    let primary_artist = album
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .ok_or_else(|| LookupError::Malformed("album has no artists".to_string()))?;
    Ok(AlbumMetadata {
        title: album.name,
        primary_artist,
    })
}
