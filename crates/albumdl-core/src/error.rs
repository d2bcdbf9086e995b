//! Errors that stop a run before any album is dispatched.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to find {}", .0.display())]
    InputMissing(PathBuf),
    #[error("{} is empty", .0.display())]
    InputEmpty(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials file {} not found", .0.display())]
    EnvFileMissing(PathBuf),
    #[error("failed to parse {}: {reason}", .path.display())]
    EnvFile { path: PathBuf, reason: String },
    #[error("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set")]
    CredentialsMissing,
    #[error("{0} does not look like a valid Spotify credential")]
    CredentialsInvalid(&'static str),
}
