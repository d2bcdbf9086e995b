//! `albumdl resolve` – print the canonical directory name for one link.

use albumdl_core::config::AlbumdlConfig;
use albumdl_core::credentials;
use albumdl_core::lookup::SpotifyClient;
use albumdl_core::resolver::Resolver;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

pub async fn run_resolve(cfg: &AlbumdlConfig, url: &str, env_file: Option<&Path>) -> Result<()> {
    let creds = credentials::load(env_file, cfg.spotify.as_ref())?;
    let resolver = Resolver::new(Arc::new(SpotifyClient::new(creds)));

    let link = url.to_string();
    let task = tokio::task::spawn_blocking(move || resolver.resolve(&link))
        .await
        .context("lookup task")?
        .with_context(|| format!("resolve {}", url))?;

    println!("{}", task.canonical_key);
    Ok(())
}
