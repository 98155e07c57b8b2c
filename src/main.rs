mod error;

use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use gsm_cache::{CacheHandle, FileCache, MemoryCache};
use gsm_config::{Config, Overrides, expand_home};
use gsm_fetch::{FetchHandle, HttpClient};
use gsm_games::ProviderOptions;
use gsm_library::{Options, Processor, Totals};
use gsm_storage::BackendHandle;
use gsm_storage::backend::LocalBackend;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use time::UtcOffset;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use tracing_subscriber::EnvFilter;

/// Collects game screenshots from many platforms into one normalized library.
#[derive(Debug, Parser)]
#[command(name = "gsm", version, about)]
struct Cli {
    /// Provider to collect screenshots from [default: steam]
    #[arg(long, value_name = "NAME")]
    provider: Option<String>,
    /// Library root [default: ./Output]
    #[arg(long, value_name = "PATH")]
    output_path: Option<PathBuf>,
    /// Provider-specific source location
    #[arg(long, value_name = "PATH")]
    input_path: Option<PathBuf>,
    /// Download cover images next to screenshots
    #[arg(long)]
    download_covers: bool,
    /// Log what would be copied without touching the library
    #[arg(long)]
    dry_run: bool,
    /// Number of games organized in parallel [default: 2]
    #[arg(long, value_name = "N")]
    workers_num: Option<usize>,
    /// Games that may wait for a worker before discovery pauses [default: 32]
    #[arg(long, value_name = "N")]
    buffer_size: Option<usize>,
    /// Log filter, overridden by RUST_LOG [default: info]
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Catalog cache directory [default: per-user cache dir]
    #[arg(long, value_name = "PATH")]
    cache_dir: Option<PathBuf>,
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}
impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            output_path: self.output_path.clone(),
            input_path: self.input_path.clone(),
            download_covers: self.download_covers.then_some(true),
            dry_run: self.dry_run.then_some(true),
            workers_num: self.workers_num,
            buffer_size: self.buffer_size,
            log_level: self.log_level.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:?}", e.raise(ErrorKind::Config));
            return ExitCode::FAILURE;
        },
    };
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("{e:?}");
        return ExitCode::FAILURE;
    }
    tracing::debug!(file = ?cli.config.clone().or_else(gsm_config::default_file), ?config, "Loaded configuration");
    // The local offset can only be read soundly while the process is still
    // single-threaded.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|_| {
        tracing::warn!("Could not determine local UTC offset, using UTC");
        UtcOffset::UTC
    });

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Could not start async runtime");
            return ExitCode::FAILURE;
        },
    };
    match runtime.block_on(run(config, utc_offset)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "{e}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).or_raise(|| ErrorKind::LogLevel(level.to_string()))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
    Ok(())
}

fn cache(config: &Config) -> CacheHandle {
    let cache = match &config.cache_dir {
        Some(dir) => expand_home(dir).map(FileCache::new).map_err(|e| e.to_string()),
        None => FileCache::user().map_err(|e| e.to_string()),
    };
    match cache {
        Ok(cache) => {
            tracing::debug!(path = %cache.root().display(), "Using catalog cache");
            Arc::new(cache)
        },
        Err(e) => {
            tracing::warn!(error = %e, "No cache directory, catalogs will not be cached");
            Arc::new(MemoryCache::new())
        },
    }
}

#[instrument(skip_all, fields(provider = %config.provider, dry_run = config.dry_run))]
async fn run(config: Config, utc_offset: UtcOffset) -> Result<Totals> {
    let http = HttpClient::new().or_raise(|| ErrorKind::Http)?;
    let registry = gsm_providers::registry(cache(&config), http.clone()).or_raise(|| ErrorKind::Registry)?;
    let provider = match registry.get(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            let available = registry.names().join(", ");
            return Err(e.raise(ErrorKind::UnknownProvider { name: config.provider.clone(), available }));
        },
    };

    let input_path = config.input_path.as_deref().map(expand_home).transpose().or_raise(|| ErrorKind::Config)?;
    let options = ProviderOptions::new(input_path).with_utc_offset(utc_offset);
    let games = provider.find_games(&options).await.or_raise(|| ErrorKind::Provider(config.provider.clone()))?;
    if games.is_empty() {
        tracing::info!("No games found");
        return Ok(Totals::default());
    }
    tracing::info!(games = games.len(), "Found games");

    let output = expand_home(&config.output_path).or_raise(|| ErrorKind::OutputPath(config.output_path.clone()))?;
    let output = std::path::absolute(&output).or_raise(|| ErrorKind::OutputPath(output.clone()))?;
    let backend: BackendHandle =
        Arc::new(LocalBackend::new("output", &output).or_raise(|| ErrorKind::OutputPath(output.clone()))?);
    let fetcher: FetchHandle = Arc::new(http);
    let mut processor = Processor::new(
        Options {
            dry_run: config.dry_run,
            download_covers: config.download_covers,
            workers: config.workers_num,
            queue_capacity: config.buffer_size,
            utc_offset,
        },
        backend,
        fetcher,
    );

    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::warn!("Interrupted, finishing games in progress");
                    token.cancel();
                },
                Err(e) => tracing::warn!(error = %e, "Could not listen for Ctrl-C"),
            }
        }
    });
    processor.start(token);
    for game in games {
        if let Err(e) = processor.submit(game).await {
            tracing::warn!(error = %e, "Stopped submitting games");
            break;
        }
    }
    let totals = processor.wait().await;
    tracing::info!(
        games = totals.games,
        skipped = totals.skipped,
        failed_games = totals.failed_games,
        copied = totals.copied,
        planned = totals.planned,
        already_present = totals.present,
        conflicts = totals.conflicts,
        failed = totals.failed,
        "Done"
    );
    Ok(totals)
}
