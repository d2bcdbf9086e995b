//! CLI for albumdl.

mod commands;

use albumdl_core::config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch, run_config, run_resolve, RunArgs};

/// Top-level CLI for albumdl.
#[derive(Debug, Parser)]
#[command(name = "albumdl")]
#[command(about = "albumdl: download a list of Spotify albums in parallel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every album listed in INPUT (one link per line).
    Run {
        /// File with one album link per line.
        #[arg(default_value = "albums.txt")]
        input: PathBuf,
        /// Albums in flight at once (default from config, 10 if unset).
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,
        /// Directory that receives one sub-directory per album (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// dotenv file with SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET (default: ./.env if present).
        #[arg(long, value_name = "PATH")]
        env_file: Option<PathBuf>,
        /// Kill the downloader after this many seconds per album.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Retry transient failures up to N more times per album.
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
    },

    /// Print the directory name an album link resolves to.
    Resolve {
        /// Spotify album link or URI.
        url: String,
        #[arg(long, value_name = "PATH")]
        env_file: Option<PathBuf>,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    /// Parses arguments and runs the command. Returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                input,
                jobs,
                output_dir,
                env_file,
                timeout,
                retries,
            } => {
                let args = RunArgs {
                    input,
                    jobs,
                    output_dir,
                    env_file,
                    timeout,
                    retries,
                };
                run_batch(&cfg, args).await
            }
            CliCommand::Resolve { url, env_file } => {
                run_resolve(&cfg, &url, env_file.as_deref()).await?;
                Ok(0)
            }
            CliCommand::Config => {
                run_config(&cfg)?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
