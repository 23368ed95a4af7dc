//! release-pin CLI
//!
//! Refreshes the pinned release manifest used by the Nix packaging.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use release_pin::{
    github::{http_client, GITHUB_API_BASE},
    manifest,
    project::{default_projects, load_projects},
    report::{color_enabled, paint, Tone},
    AssetHasher, ReleaseClient, Reporter, Result, UpdateOptions, Updater,
};

#[derive(Parser)]
#[command(name = "release-pin")]
#[command(about = "Update the standalone releases manifest with the latest upstream releases", long_about = None)]
#[command(version)]
#[command(after_help = "Do not run two instances against the same manifest at once.")]
struct Cli {
    /// Path to the releases manifest to update
    #[arg(default_value = "releases.json")]
    file: PathBuf,

    /// Re-download and recompute hashes for projects that already have entries
    #[arg(long)]
    force: bool,

    /// Maximum number of releases to keep per network
    #[arg(long, value_name = "N", default_value = "10")]
    max_releases: usize,

    /// Number of releases to fetch per network
    #[arg(long, value_name = "N", default_value = "1")]
    per_network: usize,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long)]
    no_color: bool,

    /// YAML file replacing the built-in project table
    #[arg(long, value_name = "PATH")]
    projects: Option<PathBuf>,

    /// Base URL of the release API
    #[arg(long, env = "RELEASE_PIN_API_URL", default_value = GITHUB_API_BASE)]
    api_url: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str, color: bool) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(color)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let color = color_enabled(cli.no_color, std::env::var_os("NO_COLOR").as_deref());
    setup_logging(&cli.log_level, color);

    tokio::select! {
        result = run(cli, color) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", paint(color, Tone::Error, &format!("Error: {}", e)));
                ExitCode::FAILURE
            }
        },
        _ = interrupted() => {
            eprintln!("\n{}", paint(color, Tone::Warn, "Interrupted by user"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, color: bool) -> Result<()> {
    let projects = match &cli.projects {
        Some(path) => load_projects(path)?,
        None => default_projects()?,
    };

    eprintln!(
        "{}\n",
        paint(color, Tone::Success, "=== Updating Standalone Releases ===")
    );

    let loaded = manifest::load(&cli.file)?;

    let http = http_client()?;
    let updater = Updater::new(
        ReleaseClient::new(http.clone(), &cli.api_url, cli.per_network),
        AssetHasher::new(http),
        UpdateOptions {
            force: cli.force,
            max_releases: cli.max_releases,
        },
    );
    let (updated, changes) = updater.run(&projects, &loaded.manifest).await;

    updated.save(&cli.file)?;

    let mut err = std::io::stderr().lock();
    writeln!(err)?;
    writeln!(
        err,
        "{}",
        paint(
            color,
            Tone::Success,
            &format!("✓ Updated {} successfully", cli.file.display())
        )
    )?;
    if let Some(backup) = &loaded.backup {
        writeln!(
            err,
            "{}",
            paint(
                color,
                Tone::Warn,
                &format!("  Backup saved to {}", backup.display())
            )
        )?;
    }

    Reporter::new(color).report(&mut err, &changes, &updated)?;
    Ok(())
}
