#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the tourist safety engine.
//!
//! Loads a JSON snapshot into an in-memory store, runs one engine
//! operation, and prints the result as pretty JSON on stdout. Logs go to
//! stderr (`RUST_LOG=debug` for detector evidence). Pass `--save` to write
//! the resulting store back over the snapshot.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tourist_safety_anomaly_models::Severity;
use tourist_safety_engine::{SafetyEngine, config::CONFIG_ENV_VAR, load_config};
use tourist_safety_geo_models::{Coordinate, LocationSample, RiskLevel};
use tourist_safety_store::{HistoryQuery, MemoryStore, Snapshot};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "tourist_safety",
    about = "Tourist safety scoring and anomaly detection"
)]
struct Cli {
    /// JSON snapshot (`zones`, `locations`, `itinerary`, `scores`,
    /// `anomalies`) to load
    #[arg(long)]
    snapshot: PathBuf,
    /// Engine config TOML (overrides `TOURIST_SAFETY_CONFIG`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the store back to the snapshot file afterwards
    #[arg(long)]
    save: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every detector for a tourist and rebuild their safety score
    Recompute {
        /// Tourist identifier (DTID)
        dtid: String,
        /// Evaluation time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Record a location update and apply any geofence breach
    Locate {
        /// Tourist identifier (DTID)
        dtid: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Altitude in meters
        #[arg(long, allow_negative_numbers = true)]
        altitude: Option<f64>,
        /// Reported accuracy in meters
        #[arg(long)]
        accuracy: Option<f64>,
        /// Sample time, RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Check a point against the restricted zones without storing it
    Geofence {
        /// Tourist identifier (DTID)
        dtid: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },
    /// List a tourist's stored locations, most recent first
    History {
        /// Tourist identifier (DTID)
        dtid: String,
        /// Maximum samples listed (1 gives the current location)
        #[arg(long)]
        limit: Option<usize>,
        /// Earliest sample time, RFC 3339
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Latest sample time, RFC 3339
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
    /// List the active restricted zones
    Zones,
    /// Cluster every tourist's latest position
    Clusters {
        /// Clustering radius in meters (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Show active alerts grouped by severity
    Alerts {
        /// Only list anomalies of this severity (medium, high, critical)
        #[arg(long)]
        severity: Option<Severity>,
        /// Maximum anomalies listed
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List safety scores, lowest first
    Scores {
        /// Only list scores in this band (low, medium, high, critical)
        #[arg(long)]
        band: Option<RiskLevel>,
        /// Maximum scores listed
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Mark an anomaly resolved
    Resolve {
        /// Anomaly id
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));
    let config = load_config(config_path.as_deref())?;
    log::debug!("Engine config: {config:?}");

    let store = MemoryStore::from_snapshot(Snapshot::load(&cli.snapshot)?);
    let engine = SafetyEngine::new(store, config);

    match cli.command {
        Commands::Recompute { dtid, now } => {
            let outcome = engine
                .recompute(&dtid, now.unwrap_or_else(Utc::now))
                .await?;
            print_json(&outcome)?;
        }
        Commands::Locate {
            dtid,
            lat,
            lng,
            altitude,
            accuracy,
            at,
        } => {
            let sample = LocationSample {
                dtid,
                coordinate: Coordinate {
                    latitude: lat,
                    longitude: lng,
                    altitude,
                },
                accuracy,
                timestamp: at.unwrap_or_else(Utc::now),
            };
            print_json(&engine.record_location(sample).await?)?;
        }
        Commands::Geofence { dtid, lat, lng } => {
            let check = engine
                .check_geofence(&dtid, Coordinate::new(lat, lng), Utc::now())
                .await?;
            print_json(&check)?;
        }
        Commands::History {
            dtid,
            limit,
            from,
            to,
        } => {
            let query = HistoryQuery { limit, from, to };
            print_json(&engine.location_history(&dtid, query).await?)?;
        }
        Commands::Zones => {
            print_json(&engine.zones().await?)?;
        }
        Commands::Clusters { radius } => {
            print_json(&engine.dashboard_clusters(radius).await?)?;
        }
        Commands::Alerts { severity, limit } => {
            print_json(&engine.alerts(severity, limit).await?)?;
        }
        Commands::Scores { band, limit } => {
            print_json(&engine.scores(band, limit).await?)?;
        }
        Commands::Resolve { id } => {
            print_json(&engine.resolve_anomaly(id).await?)?;
        }
    }

    if cli.save {
        engine.store().snapshot().await.save(&cli.snapshot)?;
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
