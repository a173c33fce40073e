use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use venue_availability::{
    AppConfig, AppContext, Clock, FileVenueSource, SystemClock, VenueApiClient, VenueSource,
    VenueStatus,
};

#[derive(Parser, Debug)]
#[command(name = "venue-availability")]
#[command(about = "Venue opening hours and free-drink availability")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a venue once and print its status
    Status {
        /// Read the venue from a JSON file instead of the backend
        #[arg(long, conflicts_with = "venue_id")]
        venue_file: Option<PathBuf>,

        /// Venue to fetch from the backend
        #[arg(long, required_unless_present = "venue_file")]
        venue_id: Option<String>,

        /// Local time to evaluate at, "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,

        /// Override today's redemption count
        #[arg(long)]
        redemptions: Option<u32>,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-evaluate a venue on an interval and log changes
    Watch {
        #[arg(long)]
        venue_id: String,

        /// Seconds between evaluations (defaults to watch.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn parse_local_time(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM\": {e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .parse_lossy("venue_availability=debug");

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let config = Arc::new(config);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    match args.command {
        Command::Status {
            venue_file,
            venue_id,
            at,
            redemptions,
            json,
        } => rt.block_on(async {
            let venue_id = venue_id.unwrap_or_default();
            let status = match venue_file {
                Some(path) => {
                    let ctx = AppContext::new(config, FileVenueSource::new(path), SystemClock);
                    run_status(&ctx, &venue_id, at, redemptions).await?
                }
                None => {
                    let client = VenueApiClient::new(&config.backend, &config.network)?;
                    let ctx = AppContext::new(config, client, SystemClock);
                    run_status(&ctx, &venue_id, at, redemptions).await?
                }
            };
            print_status(&status, json)
        }),
        Command::Watch { venue_id, interval } => {
            let client = VenueApiClient::new(&config.backend, &config.network)?;
            let ctx = AppContext::new(config, client, SystemClock);
            rt.block_on(run_watch(&ctx, &venue_id, interval))
        }
    }
}

async fn run_status<S: VenueSource, C: Clock>(
    ctx: &AppContext<S, C>,
    venue_id: &str,
    at: Option<NaiveDateTime>,
    redemptions: Option<u32>,
) -> Result<VenueStatus> {
    let now = at.unwrap_or_else(|| ctx.clock().now());
    ctx.status_at(venue_id, now, redemptions).await
}

fn print_status(status: &VenueStatus, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(status).context("Failed to serialize status")?;
        println!("{out}");
    } else {
        for line in status.summary() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Poll the venue and log whenever its availability changes.
async fn run_watch<S: VenueSource, C: Clock>(
    ctx: &AppContext<S, C>,
    venue_id: &str,
    interval: Option<u64>,
) -> Result<()> {
    let interval_secs = interval.unwrap_or(ctx.config.watch.interval_secs);
    tracing::info!(venue_id, interval_secs, "Starting venue watch");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut previous: Option<VenueStatus> = None;
    loop {
        interval.tick().await;

        let status = match ctx.status(venue_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Failed to evaluate venue: {:#}", e);
                continue;
            }
        };

        match &previous {
            Some(prev) => {
                for change in status.transition_from(prev) {
                    tracing::info!("{}", change);
                }
            }
            None => {
                for line in status.summary() {
                    tracing::info!("{}", line);
                }
            }
        }

        previous = Some(status);
    }
}
