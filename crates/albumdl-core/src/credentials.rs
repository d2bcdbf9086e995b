//! Spotify client credentials: loaded once at startup, passed explicitly to the client.
//!
//! Sources, first match wins: an explicit `.env`-style file (or `./.env` when it
//! exists), then the `[spotify]` config section. The process environment is
//! never read or modified.

use std::fmt;
use std::path::Path;

use crate::config::SpotifyConfig;
use crate::error::StartupError;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";

/// Shortest id/secret we accept. Spotify issues 32-character hex strings.
const MIN_LEN: usize = 16;

/// Validated client id and secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Validates that both values are structurally plausible.
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self, StartupError> {
        let client_id = client_id.trim();
        let client_secret = client_secret.trim();
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(StartupError::CredentialsMissing);
        }
        for (name, value) in [(CLIENT_ID_VAR, client_id), (CLIENT_SECRET_VAR, client_secret)] {
            if value.len() < MIN_LEN || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(StartupError::CredentialsInvalid(name));
            }
        }
        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Load credentials from `env_file` if given, else `./.env` if present, else the config section.
pub fn load(env_file: Option<&Path>, config: Option<&SpotifyConfig>) -> Result<Credentials, StartupError> {
    let default_env = Path::new(".env");
    let env_file = match env_file {
        Some(p) => Some(p),
        None if default_env.exists() => Some(default_env),
        None => None,
    };

    if let Some(path) = env_file {
        return from_env_file(path);
    }

    match config {
        Some(SpotifyConfig {
            client_id: Some(id),
            client_secret: Some(secret),
        }) => Credentials::new(id, secret),
        _ => Err(StartupError::CredentialsMissing),
    }
}

/// Parse `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` out of a dotenv file.
pub fn from_env_file(path: &Path) -> Result<Credentials, StartupError> {
    if !path.exists() {
        return Err(StartupError::EnvFileMissing(path.to_path_buf()));
    }
    let iter = dotenvy::from_path_iter(path).map_err(|e| StartupError::EnvFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut client_id = None;
    let mut client_secret = None;
    for item in iter {
        let (key, value) = item.map_err(|e| StartupError::EnvFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        match key.as_str() {
            CLIENT_ID_VAR => client_id = Some(value),
            CLIENT_SECRET_VAR => client_secret = Some(value),
            _ => {}
        }
    }

    match (client_id, client_secret) {
        (Some(id), Some(secret)) => Credentials::new(&id, &secret),
        _ => Err(StartupError::CredentialsMissing),
    }
}
