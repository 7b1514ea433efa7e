//! Userfeed - aggregate a user's profile, posts and comments
//!
//! A CLI tool that pulls a user's content from three independent data
//! sources, sequentially or concurrently, and compares the latency of the
//! two approaches.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Aggregation failed (profile or posts unavailable), deadline
//!       exceeded, or runtime error

mod aggregate;
mod cli;
mod config;
mod error;
mod models;
mod observer;
mod report;
mod source;

#[cfg(test)]
mod testing;

use aggregate::{compare_latency, AggregateRun, Strategy};
use anyhow::{Context, Result};
use cli::{Args, Mode, OutputFormat};
use config::Config;
use error::AggregateError;
use models::UserId;
use observer::{AggregationObserver, TracingObserver};
use report::{ComparisonReport, RunReport};
use source::{CountingSource, DataSource, SimulatedSource, SourceLatency};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded before logging so `general.verbose` can take effect
    let (mut config, config_note) = load_config(&args)?;
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("Userfeed v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_note {
        ConfigNote::Loaded(path) => info!("Loaded config from {}", path),
        ConfigNote::Defaults => debug!("No config file found, using defaults"),
        ConfigNote::Invalid(e) => warn!("Failed to load config: {:#}", e),
    }

    match run(&args, &config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .userfeed.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Where the configuration came from, logged once logging is up.
enum ConfigNote {
    Loaded(String),
    Defaults,
    Invalid(anyhow::Error),
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load; a broken default file only warns.
fn load_config(args: &Args) -> Result<(Config, ConfigNote)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigNote::Loaded(config_path.display().to_string())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((
            config,
            ConfigNote::Loaded(config::DEFAULT_CONFIG_FILE.to_string()),
        )),
        Ok(None) => Ok((Config::default(), ConfigNote::Defaults)),
        Err(e) => Ok((Config::default(), ConfigNote::Invalid(e))),
    }
}

/// Run the configured mode and emit its output. Returns the exit code.
async fn run(args: &Args, config: &Config) -> Result<i32> {
    let simulated = SimulatedSource::new(SourceLatency::from(&config.source), args.failure_plan());
    debug!("Simulated latency: {:?}", simulated.latency());

    let counting = Arc::new(CountingSource::new(simulated));
    let source: Arc<dyn DataSource> = counting.clone();
    let observer: Arc<dyn AggregationObserver> = Arc::new(TracingObserver);

    let user_id = config.general.user_id;
    let mode = config.general.mode;
    let format = config.output.format;
    let deadline = config.general.deadline_ms.map(Duration::from_millis);

    let (output, exit_code) = match mode.strategy() {
        Some(strategy) => {
            let aggregator = aggregate::build(strategy, source, observer);
            match with_deadline(deadline, aggregator.run_timed(user_id)).await? {
                Ok(run) => (render_run(format, mode, strategy, user_id, &run)?, 0),
                Err(err) => (render_failure(format, mode, user_id, &err)?, 1),
            }
        }
        None => match with_deadline(deadline, compare_latency(source, observer, user_id)).await? {
            Ok(comparison) => {
                let output = match format {
                    OutputFormat::Text => report::generate_comparison_text(&comparison),
                    OutputFormat::Json => {
                        report::generate_json_report(&ComparisonReport::from(&comparison))?
                    }
                };
                (output, 0)
            }
            Err(err) => (render_failure(format, mode, user_id, &err)?, 1),
        },
    };

    let stats = counting.stats();
    debug!(
        "Source calls: {} total (profile={}, posts={}, comments={}, peak {} concurrent)",
        stats.total_calls(),
        stats.profile_calls,
        stats.posts_calls,
        stats.comments_calls,
        stats.peak_comments_in_flight
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(exit_code)
}

/// Apply the caller-imposed deadline, if any, to a whole run.
async fn with_deadline<T>(deadline: Option<Duration>, run: impl Future<Output = T>) -> Result<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .with_context(|| format!("Aggregation did not finish within {}ms", limit.as_millis())),
        None => Ok(run.await),
    }
}

fn render_run(
    format: OutputFormat,
    mode: Mode,
    strategy: Strategy,
    user_id: UserId,
    run: &AggregateRun,
) -> Result<String> {
    debug!(
        "Aggregated {} posts with {} comments",
        run.result.posts.len(),
        run.result.comment_count()
    );

    match format {
        OutputFormat::Text => Ok(report::generate_run_text(strategy, run)),
        OutputFormat::Json => report::generate_json_report(&RunReport::success(mode, user_id, run)),
    }
}

fn render_failure(
    format: OutputFormat,
    mode: Mode,
    user_id: UserId,
    err: &AggregateError,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report::generate_failure_text(err)),
        OutputFormat::Json => report::generate_json_report(&RunReport::failure(mode, user_id, err)),
    }
}
