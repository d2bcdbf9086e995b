//! `albumdl config` – show where the config lives and what is in effect.

use albumdl_core::config::{self, AlbumdlConfig};
use anyhow::Result;

pub fn run_config(cfg: &AlbumdlConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());

    // Never echo the client secret.
    let mut shown = cfg.clone();
    if let Some(spotify) = shown.spotify.as_mut() {
        if spotify.client_secret.is_some() {
            spotify.client_secret = Some("<redacted>".to_string());
        }
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
