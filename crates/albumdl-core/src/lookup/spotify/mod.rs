//! Spotify Web API metadata lookup (client-credentials flow).
//!
//! Uses the curl crate (libcurl) for the token and album requests. All calls
//! block the current thread; the batch orchestrator runs them on the blocking
//! pool.
//!
//! Lookups that find no cached token each fetch one, since no lock is held
//! across the request. Call [`SpotifyClient::prefetch_token`] before a batch so
//! concurrent workers start from one shared token.

mod http;
mod link;
mod parse;

pub use link::album_id;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::credentials::Credentials;
use crate::lookup::{AlbumMetadata, LookupError, MetadataLookup};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Refresh this long before the server-side expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Metadata lookup against the Spotify catalog.
///
/// The access token is cached and shared between worker threads; the lock is
/// only held to read or replace the cached value, never across a request.
pub struct SpotifyClient {
    credentials: Credentials,
    token_url: String,
    api_base: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, TOKEN_URL, API_BASE)
    }

    /// Point the client at other endpoints (a local test server, a proxy).
    pub fn with_endpoints(
        credentials: Credentials,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    /// Fetch and cache an access token now, unless a fresh one is cached already.
    pub fn prefetch_token(&self) -> Result<(), LookupError> {
        self.access_token().map(|_| ())
    }

    /// Returns a valid token, fetching a new one if none is cached or it is about to expire.
    fn access_token(&self) -> Result<String, LookupError> {
        if let Some(cached) = self.cached_token() {
            return Ok(cached);
        }

        let response = http::post_client_credentials(
            &self.token_url,
            self.credentials.client_id(),
            self.credentials.client_secret(),
        )?;
        if !(200..300).contains(&response.code) {
            tracing::warn!(code = response.code, "token request rejected");
            return Err(http::classify_token_status(response.code));
        }
        let (value, ttl) = parse::parse_token(&response.body)?;
        let refresh_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_MARGIN);
        tracing::debug!(ttl_secs = ttl.as_secs(), "fetched spotify access token");

        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(CachedToken {
                value: value.clone(),
                refresh_at,
            });
        }
        Ok(value)
    }

    fn cached_token(&self) -> Option<String> {
        let slot = self.token.lock().ok()?;
        slot.as_ref()
            .filter(|t| Instant::now() < t.refresh_at)
            .map(|t| t.value.clone())
    }

    fn invalidate_token(&self) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
    }

    fn fetch_album(&self, id: &str, token: &str) -> Result<http::Response, LookupError> {
        let url = format!("{}/albums/{}", self.api_base, id);
        http::get_with_bearer(&url, token)
    }
}

impl MetadataLookup for SpotifyClient {
    fn lookup(&self, identifier: &str) -> Result<AlbumMetadata, LookupError> {
        let id = album_id(identifier)?;

        let token = self.access_token()?;
        let mut response = self.fetch_album(&id, &token)?;

        // A cached token may have been revoked early; refresh once before giving up.
        if response.code == 401 {
            tracing::debug!("album request got 401, refreshing token");
            self.invalidate_token();
            let token = self.access_token()?;
            response = self.fetch_album(&id, &token)?;
        }

        if !(200..300).contains(&response.code) {
            return Err(http::classify_api_status(response.code));
        }
        parse::parse_album(&response.body)
    }
}
