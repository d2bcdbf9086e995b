//! `albumdl run` – download every album in the input list.

use albumdl_core::batch::{AbortSignal, BatchRunner};
use albumdl_core::config::{AlbumdlConfig, RetryConfig};
use albumdl_core::credentials;
use albumdl_core::executor::ProcessExecutor;
use albumdl_core::input;
use albumdl_core::lookup::SpotifyClient;
use albumdl_core::oracle::DirectoryOracle;
use albumdl_core::report::{BatchEvent, LogReporter, Reporter};
use albumdl_core::resolver::Resolver;
use albumdl_core::retry::RetryPolicy;
use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Exit code when at least one album did not end downloaded or skipped.
const EXIT_INCOMPLETE: i32 = 2;

/// Exit code after a second Ctrl-C (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Flags of `albumdl run`; `None` means "take it from the config".
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub input: PathBuf,
    pub jobs: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
}

/// Config merged with command-line overrides.
#[derive(Debug, Clone)]
struct RunSettings {
    concurrency: usize,
    output_dir: PathBuf,
    timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl RunSettings {
    fn merge(cfg: &AlbumdlConfig, args: &RunArgs, cwd: &Path) -> Self {
        let concurrency = args.jobs.unwrap_or(cfg.concurrency).max(1);
        let output_dir = args
            .output_dir
            .clone()
            .or_else(|| cfg.output_dir.clone())
            .unwrap_or_else(|| cwd.to_path_buf());
        let timeout = args
            .timeout
            .map(Duration::from_secs)
            .or_else(|| cfg.downloader_timeout());
        let retry = match args.retries {
            Some(extra) => {
                let base = cfg.retry.clone().unwrap_or_default();
                RetryConfig {
                    max_attempts: extra.saturating_add(1),
                    ..base
                }
                .to_policy()
            }
            None => cfg.retry_policy(),
        };
        Self {
            concurrency,
            output_dir,
            timeout,
            retry,
        }
    }
}

pub async fn run_batch(cfg: &AlbumdlConfig, args: RunArgs) -> Result<i32> {
    let cwd = std::env::current_dir().context("current directory")?;
    let settings = RunSettings::merge(cfg, &args, &cwd);
    tracing::debug!("run settings: {:?}", settings);

    let identifiers = input::read_identifiers(&args.input)?;
    let creds = credentials::load(args.env_file.as_deref(), cfg.spotify.as_ref())?;

    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("create output dir {}", settings.output_dir.display()))?;

    let mut oracle = DirectoryOracle::new(&settings.output_dir);
    if let Some(marker) = &cfg.completion_marker {
        oracle = oracle.with_marker(marker.clone());
    }
    let executor = ProcessExecutor::from_config(cfg, &settings.output_dir).with_timeout(settings.timeout);
    let reporter: Arc<dyn Reporter> = Arc::new(LogReporter::stdout());

    // One token up front, so the first wave of workers does not each request its own.
    let client = Arc::new(SpotifyClient::new(creds));
    let prefetch = Arc::clone(&client);
    match tokio::task::spawn_blocking(move || prefetch.prefetch_token()).await {
        Ok(Ok(())) => tracing::debug!("spotify token prefetched"),
        Ok(Err(e)) => tracing::warn!("token prefetch failed, lookups will retry: {}", e),
        Err(e) => tracing::warn!("token prefetch task: {}", e),
    }

    let runner = BatchRunner::new(
        Resolver::new(client),
        Arc::new(oracle),
        Arc::new(executor),
        Arc::clone(&reporter),
    )
    .with_retry_policy(settings.retry);

    // First Ctrl-C stops dispatch and lets running albums finish; a second one quits.
    let abort = runner.abort_signal();
    let interrupt_reporter = Arc::clone(&reporter);
    let interrupt = tokio::spawn(async move {
        let signals = || tokio::signal::ctrl_c();
        if let Some(code) = handle_interrupts(signals, abort, interrupt_reporter).await {
            eprintln!("albumdl: interrupted again, exiting");
            std::process::exit(code);
        }
    });

    let report = runner.run_batch(&identifiers, settings.concurrency).await;
    interrupt.abort();

    println!("{}", report);
    if report.has_failures() {
        Ok(EXIT_INCOMPLETE)
    } else {
        Ok(0)
    }
}

/// Waits on `next_signal`: the first signal raises `abort`, the second returns the
/// force-quit exit code. Returns None if the signal source fails.
async fn handle_interrupts<S, F>(
    mut next_signal: S,
    abort: AbortSignal,
    reporter: Arc<dyn Reporter>,
) -> Option<i32>
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    next_signal().await.ok()?;
    let reason = "interrupted".to_string();
    if abort.raise(reason.clone()) {
        reporter.report(&BatchEvent::Fatal { reason });
    }
    next_signal().await.ok()?;
    Some(EXIT_INTERRUPTED)
}
