//! CLI entry point for the transit fleet aggregator.
//!
//! Provides subcommands for listing routes, fetching vehicle positions for a
//! set of routes or the whole fleet, computing per-route direction statistics,
//! and reporting upstream call counts.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_fleet::{
    Cancel, FleetService,
    config::Config,
    fetch::BasicClient,
    output::{append_stats, print_json},
    tracker::SqliteCallTracker,
    upstream::{BATCH_CAP, UpstreamClient},
};

#[derive(Parser)]
#[command(name = "transit_fleet")]
#[command(about = "Aggregates live vehicle positions per route", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all routes known to the upstream provider
    Routes,
    /// Fetch vehicles for up to 10 routes
    Vehicles {
        /// Comma-separated route identifiers (e.g. "8,9,X9")
        #[arg(value_name = "ROUTES")]
        routes: String,
    },
    /// Fetch vehicles on every route
    AllVehicles,
    /// Count active vehicles per route by direction
    Stats {
        /// Optional CSV file to append the snapshot to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show how many upstream calls have been recorded
    TrackingCounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/transit_fleet.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_fleet.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    // Tracking is optional: without a database the service runs untracked.
    let tracker = match SqliteCallTracker::open(&config.tracker_db_path).await {
        Ok(tracker) => Some(Arc::new(tracker)),
        Err(e) => {
            warn!(path = %config.tracker_db_path, error = %e, "call tracker database unavailable");
            None
        }
    };

    let cancel = Cancel::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    match cli.command {
        Commands::Routes => {
            let service = build_service(&config, tracker.as_ref())?;
            let routes = service.get_routes(&cancel).await?;
            print_json(&routes)?;
        }
        Commands::Vehicles { routes } => {
            let route_ids = parse_route_ids(&routes)?;
            let service = build_service(&config, tracker.as_ref())?;
            let vehicles = service.get_vehicles(&cancel, &route_ids).await?;
            print_json(&vehicles)?;
        }
        Commands::AllVehicles => {
            let service = build_service(&config, tracker.as_ref())?;
            let vehicles = service.get_all_vehicles(&cancel).await?;
            print_json(&vehicles)?;
        }
        Commands::Stats { output } => {
            let service = build_service(&config, tracker.as_ref())?;
            let stats = service.get_route_stats(&cancel).await?;
            if let Some(path) = output {
                append_stats(&path, &stats, Utc::now())?;
                info!(path = %path, rows = stats.len(), "Snapshot appended");
            }
            print_json(&stats)?;
        }
        Commands::TrackingCounts => {
            let Some(tracker) = &tracker else {
                bail!("call tracker database is unavailable");
            };
            let counts = serde_json::json!({
                "total": tracker.total_count().await?,
                "today": tracker.count_today().await?,
                "byEndpoint": tracker.count_by_endpoint().await?,
            });
            print_json(&counts)?;
        }
    }

    if let Some(tracker) = tracker {
        tracker.close().await;
    }
    Ok(())
}

/// Builds the upstream client, attaching the call tracker when one is open.
fn build_service(
    config: &Config,
    tracker: Option<&Arc<SqliteCallTracker>>,
) -> Result<FleetService<BasicClient>> {
    let mut upstream =
        UpstreamClient::from_config(config).context("failed to create upstream client")?;
    if let Some(tracker) = tracker {
        upstream = upstream.with_recorder(tracker.clone());
    }
    Ok(FleetService::new(upstream))
}

/// Splits a comma-separated route list, dropping blank entries.
fn parse_route_ids(raw: &str) -> Result<Vec<String>> {
    let route_ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    if route_ids.is_empty() {
        bail!("at least one route identifier is required (comma-separated)");
    }
    if route_ids.len() > BATCH_CAP {
        bail!("a maximum of {BATCH_CAP} routes can be requested at once");
    }
    Ok(route_ids)
}
