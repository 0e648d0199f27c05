#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the hazard map risk engine.
//!
//! Provides subcommands for assessing a single location, a uniform grid
//! over a bounding box, and a time series of dates. Results are printed
//! as pretty JSON on stdout; progress and warnings go to the logger.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hazard_map_cache::MemoryCache;
use hazard_map_engine::{AssessOptions, EngineConfig, RiskEngine};
use hazard_map_geo_models::{BoundingBox, Coordinate, DateRange};
use hazard_map_source::{GradientTerrain, OpenMeteoWeather};
use hazard_map_stats::{Bounds, DataKind};

/// Assess climate hazard risk from historical weather and terrain data.
#[derive(Parser)]
#[command(name = "hazard_map_cli")]
#[command(about = "Climate hazard risk assessment tool")]
struct Cli {
    /// Path to a TOML configuration file. Omitted sections fall back to
    /// built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Assess flood, drought, and landslide risk at one location
    Point {
        /// Latitude in decimal degrees
        lat: f64,
        /// Longitude in decimal degrees
        lon: f64,
        /// Days of recent data the models score against
        #[arg(long, default_value = "30")]
        history_days: u32,
        /// Days of history fetched for baselines, ending at the assessment date
        #[arg(long, default_value = "365")]
        baseline_days: u32,
    },
    /// Assess every point of a uniform grid over a bounding box
    Grid {
        /// Northern edge, decimal degrees
        #[arg(long)]
        north: f64,
        /// Southern edge, decimal degrees
        #[arg(long)]
        south: f64,
        /// Eastern edge, decimal degrees
        #[arg(long)]
        east: f64,
        /// Western edge, decimal degrees
        #[arg(long)]
        west: f64,
        /// Subdivisions per side; the lattice holds (size + 1)^2 points
        #[arg(long, default_value = "4")]
        size: usize,
        /// Interpolate the assessed cells onto a denser lattice of this
        /// size and print the estimated surface instead of raw cells
        #[arg(long)]
        surface: Option<usize>,
        /// Days of recent data the models score against
        #[arg(long, default_value = "30")]
        history_days: u32,
        /// Days of history fetched for baselines, ending at the assessment date
        #[arg(long, default_value = "365")]
        baseline_days: u32,
        /// Maximum concurrent cell assessments
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
    /// Assess one location at fixed date steps through a range
    Series {
        /// Latitude in decimal degrees
        lat: f64,
        /// Longitude in decimal degrees
        lon: f64,
        /// First assessment date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last assessment date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Days between assessment dates
        #[arg(long, default_value = "7")]
        interval: u32,
        /// Days of recent data the models score against
        #[arg(long, default_value = "30")]
        history_days: u32,
        /// Days of history fetched for baselines, ending at each assessment date
        #[arg(long, default_value = "365")]
        baseline_days: u32,
        /// Maximum concurrent date assessments
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let engine = build_engine(&config)?;

    match cli.command {
        Commands::Point {
            lat,
            lon,
            history_days,
            baseline_days,
        } => {
            let options = AssessOptions {
                history_days,
                baseline_days,
                ..AssessOptions::default()
            };

            let started = Instant::now();
            let assessment = engine
                .assess_point(Coordinate::new(lat, lon), &options)
                .await?;
            log::info!(
                "Assessment complete in {:.1}s",
                started.elapsed().as_secs_f64()
            );

            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }
        Commands::Grid {
            north,
            south,
            east,
            west,
            size,
            surface,
            history_days,
            baseline_days,
            concurrency,
        } => {
            let bbox = BoundingBox::validated(north, south, east, west)?;
            let options = AssessOptions {
                history_days,
                baseline_days,
                concurrency,
                ..AssessOptions::default()
            };

            let started = Instant::now();
            let cells = engine.assess_grid(bbox, size, &options).await?;
            log::info!(
                "Assessed {} of {} grid cells in {:.1}s",
                cells.len(),
                (size + 1) * (size + 1),
                started.elapsed().as_secs_f64()
            );

            if let Some(resolution) = surface {
                // Risk scores live in [0, 1], so the palette bounds are fixed
                // rather than derived from the observed cells.
                let bounds = Bounds::new(0.0, 1.0);
                let shaded: Vec<serde_json::Value> = engine
                    .risk_surface(bbox, resolution, &cells)
                    .iter()
                    .map(|sample| {
                        serde_json::json!({
                            "point": sample.point,
                            "value": sample.value,
                            "color": DataKind::Risk.color_for_value(sample.value, bounds),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&shaded)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&cells)?);
            }
        }
        Commands::Series {
            lat,
            lon,
            start,
            end,
            interval,
            history_days,
            baseline_days,
            concurrency,
        } => {
            let range = DateRange::new(start, end)?;
            let options = AssessOptions {
                history_days,
                baseline_days,
                concurrency,
                ..AssessOptions::default()
            };

            let started = Instant::now();
            let steps = engine
                .assess_time_series(Coordinate::new(lat, lon), &range, interval, &options)
                .await?;
            log::info!(
                "Assessed {} of {} dates in {:.1}s",
                steps.len(),
                (range.num_days() - 1).div_euclid(i64::from(interval)) + 1,
                started.elapsed().as_secs_f64()
            );

            println!("{}", serde_json::to_string_pretty(&steps)?);
        }
    }

    Ok(())
}

/// Wires the Open-Meteo providers and an in-memory cache into an engine.
fn build_engine(config: &EngineConfig) -> Result<RiskEngine, Box<dyn std::error::Error>> {
    let weather = OpenMeteoWeather::new(config.weather.clone())?;
    let terrain = GradientTerrain::new(config.terrain.clone(), config.geometry)?;
    let cache = MemoryCache::new(config.cache);

    Ok(RiskEngine::new(
        config,
        Arc::new(weather),
        Arc::new(terrain),
        Arc::new(cache),
    ))
}
