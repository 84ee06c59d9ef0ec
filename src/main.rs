mod config;
mod logging;
mod ports;
mod rimusic;
mod services;
mod youtube_rs;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    logging::setup_logging,
    ports::youtube::PrivacyStatus,
    rimusic::read_export,
    services::{
        credentials::TokenCacheCredentialProvider,
        migrate::{MigrationOutcome, MigrationRequest, Planned, plan_migration, run_migration},
        sync::{PlaylistSettings, SyncProgress, SyncReport},
        youtube::YouTubeHttpAdapter,
    },
};

/// Import playlists exported from RiMusic to YouTube.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The playlist exported from RiMusic to be processed
    #[arg(value_parser = is_export_file)]
    csv_playlist: PathBuf,

    /// Name of the YouTube playlist (default: date and title from the file name)
    playlist_name: Option<String>,

    /// Only print the tracks that would be added, without contacting YouTube
    #[arg(short, long)]
    dry_run: bool,

    /// A previously imported export; tracks already in it are skipped
    #[arg(long = "already_processed", value_parser = is_export_file)]
    already_processed: Option<PathBuf>,

    /// Visibility of the created playlist (default: from config, else public)
    #[arg(long, value_enum)]
    privacy: Option<PrivacyStatus>,

    /// The config file to use
    #[arg(short, long, env = "RIMUSIC2YT_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "debug")]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "RIMUSIC2YT_LOG_FILE")]
    log_file: Option<PathBuf>,
}

const EXPORT_EXTENSION: &str = "csv";

fn is_export_file(s: &str) -> Result<PathBuf, String> {
    let p: PathBuf = s.into();
    if !p.exists() {
        Err(format!("`{}` does not exist", s))
    } else if !p.is_file() {
        Err(format!("`{}` is not a file", s))
    } else if p.extension().and_then(|ext| ext.to_str()) != Some(EXPORT_EXTENSION) {
        Err(format!("`{}` is not a .{} file", s, EXPORT_EXTENSION))
    } else {
        Ok(p)
    }
}

fn print_progress(progress: SyncProgress<'_>) {
    let outcome = progress.outcome;
    match &outcome.result {
        Ok(()) => println!(
            "[{}/{}] added {}",
            progress.processed, progress.total, outcome.media_id
        ),
        Err(e) => println!(
            "[{}/{}] failed {}: {}",
            progress.processed, progress.total, outcome.media_id, e
        ),
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "Added {} of {} tracks to \"{}\" ({})",
        report.succeeded(),
        report.total(),
        report.playlist.title,
        report.playlist.url()
    );
    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("{} tracks could not be added:", failures.len());
        for (media_id, e) in failures {
            println!("  {}: {}", media_id, e);
        }
    }
}

fn print_outcome(outcome: MigrationOutcome) {
    match outcome {
        MigrationOutcome::DryRun(plan) => {
            log::info!(
                "Dry run for playlist '{}': {} tracks",
                plan.playlist_name,
                plan.tracks.len()
            );
            for track in &plan.tracks {
                println!("{}", track.display_line());
            }
        }
        MigrationOutcome::NothingToSync(plan) => {
            println!(
                "Nothing to add to \"{}\": every track was already processed",
                plan.playlist_name
            );
        }
        MigrationOutcome::Synced(report) => print_report(&report),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("rimusic2yt starting");

    let export = read_export(&args.csv_playlist)?;
    if export.is_empty() {
        log::warn!("{} contains no tracks", args.csv_playlist.display());
    }
    let already_processed = args
        .already_processed
        .as_deref()
        .map(read_export)
        .transpose()?;

    if already_processed.is_none() && !args.dry_run {
        log::warn!(
            "No --already_processed export given; tracks imported by an earlier run will be added again"
        );
    }

    let request = MigrationRequest {
        export,
        already_processed,
        playlist_name: args.playlist_name,
        dry_run: args.dry_run,
    };

    let driver = match plan_migration(&request) {
        Planned::Finished(outcome) => {
            print_outcome(outcome);
            return Ok(());
        }
        Planned::Remote(driver) => driver,
    };

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load rimusic2yt config")?;

    let settings = PlaylistSettings {
        privacy: args.privacy.unwrap_or(config.privacy_status),
        description: config.playlist_description.clone(),
    };
    let provider =
        TokenCacheCredentialProvider::new(config.client_secret_path(), config.token_cache_path());
    let base_url = config.api_base_url()?;

    let outcome = run_migration(
        driver,
        &provider,
        |credential| YouTubeHttpAdapter::new(base_url, credential),
        settings,
        print_progress,
    )
    .await?;
    print_outcome(outcome);

    Ok(())
}
