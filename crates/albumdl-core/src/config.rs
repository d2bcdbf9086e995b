use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::batch::DEFAULT_CONCURRENCY;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per album (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 2.0,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Negative or NaN base delays become zero; infinite or oversized ones are capped at `max_delay`.
    pub fn to_policy(&self) -> RetryPolicy {
        let max_delay = Duration::from_secs(self.max_delay_secs);
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs.max(0.0))
            .unwrap_or(max_delay)
            .min(max_delay);
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }
}

/// External downloader invocation (`[downloader]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Program to run per album; looked up on PATH.
    pub program: String,
    /// Arguments placed between the album link and `--output <dir>`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Kill the downloader after this many seconds (None = wait forever).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "spotdl".to_string(),
            args: vec!["--overwrite".to_string(), "skip".to_string()],
            timeout_secs: None,
        }
    }
}

/// Spotify API client credentials (`[spotify]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Global configuration loaded from `~/.config/albumdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumdlConfig {
    /// Maximum number of albums resolved or downloaded at once.
    pub concurrency: usize,
    /// Root directory albums are downloaded into (None = current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// If set, an album only counts as done when `<album dir>/<marker>` exists.
    #[serde(default)]
    pub completion_marker: Option<String>,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    /// Optional retry policy; if missing, albums are attempted once.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub spotify: Option<SpotifyConfig>,
}

impl Default for AlbumdlConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            output_dir: None,
            completion_marker: None,
            downloader: DownloaderConfig::default(),
            retry: None,
            spotify: None,
        }
    }
}

impl AlbumdlConfig {
    /// Retry policy from the `[retry]` section, or a single attempt.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_else(RetryPolicy::single_attempt)
    }

    pub fn downloader_timeout(&self) -> Option<Duration> {
        self.downloader.timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("albumdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AlbumdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AlbumdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AlbumdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
