//! site-mirror main entry point
//!
//! This is the command-line interface for mirroring a website to local disk.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{load_config_with_hash, Config, MirrorJob};
use site_mirror::crawler::{mirror_until, Coordinator};
use site_mirror::output::write_markdown_report;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// site-mirror: a self-contained website mirror
///
/// Fetches the seed page, downloads the images, stylesheets, and scripts it
/// references, follows same-site links, and rewrites every reference so the
/// copy can be browsed offline.
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(version)]
#[command(about = "Mirror a website for offline browsing", long_about = None)]
struct Cli {
    /// Seed URL to mirror
    #[arg(value_name = "URL")]
    url: String,

    /// Directory under which `<host>/` is written
    #[arg(short, long, value_name = "DIR", default_value = "sites")]
    output: PathBuf,

    /// Per-page render timeout in seconds
    #[arg(short, long, value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,

    /// Do not read sitemap.xml for extra seeds
    #[arg(long)]
    skip_sitemap: bool,

    /// Do not check robots.txt
    #[arg(long)]
    skip_robots: bool,

    /// Path to a TOML tuning file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write the report as markdown to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Directory for the persistent log file
    #[arg(long, value_name = "DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging(cli.verbose, cli.quiet, &cli.log_dir)?;

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    let job = MirrorJob::new(&cli.url, &cli.output, cli.timeout)
        .context("Invalid mirror job")?
        .skip_sitemap(cli.skip_sitemap)
        .skip_robots(cli.skip_robots);

    let mut coordinator =
        Coordinator::new(job, config).context("Failed to initialize the mirror")?;
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    let report = mirror_until(&mut coordinator, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await;

    println!("\n{}", report);

    if let Some(path) = &cli.report {
        write_markdown_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(if report.status.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Sets up the logging/tracing subscriber
///
/// Two layers share one verbosity filter: compact lines on stderr, and a
/// plain-text `mirror.log` under `log_dir` written by a background worker.
/// `RUST_LOG` overrides the verbosity flags when set.
fn setup_logging(verbose: u8, quiet: bool, log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let directives = if quiet {
        // Only show errors
        "error"
    } else {
        match verbose {
            0 => "site_mirror=info,mirror=info,warn",
            1 => "site_mirror=debug,mirror=debug,info",
            2 => "site_mirror=trace,mirror=trace,debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let file_appender = tracing_appender::rolling::never(log_dir, "mirror.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter.clone());

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .compact()
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
