#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk assessment orchestration.
//!
//! [`RiskEngine`] wires the weather and terrain providers, the anomaly
//! detector, the hazard models, the composite index, and the result cache
//! into three entry points: a single point, a uniform grid over a bounding
//! box, and a time series of dates. Providers and the cache are injected as
//! trait objects at construction, so the engine itself performs no HTTP and
//! owns no storage.
//!
//! Grid and series elements are independent: they run concurrently with
//! bounded parallelism, and a failing element is logged and dropped rather
//! than failing the whole batch.

mod inputs;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use futures::StreamExt;
use hazard_map_cache::{CacheConfig, ResultCache, cache_key};
use hazard_map_geo_models::{BoundingBox, Coordinate, DateRange};
use hazard_map_hazard_models::{
    DatedAssessment, GridAssessment, HazardKind, RiskAssessment, RiskScore,
};
use hazard_map_scoring::{
    CompositeConfig, CompositeIndex, DroughtConfig, DroughtModel, FloodConfig, FloodModel,
    LandslideConfig, LandslideModel,
};
use hazard_map_source::{
    OpenMeteoConfig, SourceError, TerrainConfig, TerrainProvider, WeatherField, WeatherProvider,
};
use hazard_map_spatial::{Geodesic, GeometryConfig, IdwConfig, Interpolator, SpatialSample};
use hazard_map_stats::{AnomalyConfig, AnomalyDetector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The upstream series every assessment requests.
const ASSESSMENT_FIELDS: [WeatherField; 4] = [
    WeatherField::PrecipitationSum,
    WeatherField::TemperatureMean,
    WeatherField::SoilMoisture,
    WeatherField::VegetationIndex,
];

/// Errors surfaced by engine entry points.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The request was rejected before any I/O was attempted.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the request.
        message: String,
    },

    /// Required upstream data could not be fetched or was absent.
    #[error("required data unavailable: {message}")]
    DataUnavailable {
        /// The underlying failure description.
        message: String,
    },
}

impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        Self::DataUnavailable {
            message: err.to_string(),
        }
    }
}

/// Aggregated configuration for the engine and its collaborators.
///
/// One TOML document describes a whole deployment; every section and every
/// field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Great-circle geometry constants.
    pub geometry: GeometryConfig,
    /// Inverse-distance interpolation tuning.
    pub idw: IdwConfig,
    /// Anomaly detection tuning.
    pub anomaly: AnomalyConfig,
    /// Flood model weights and thresholds.
    pub flood: FloodConfig,
    /// Drought model weights and thresholds.
    pub drought: DroughtConfig,
    /// Landslide model weights and thresholds.
    pub landslide: LandslideConfig,
    /// Composite index weights.
    pub composite: CompositeConfig,
    /// Result cache bounds.
    pub cache: CacheConfig,
    /// Open-Meteo weather client settings.
    pub weather: OpenMeteoConfig,
    /// Elevation client settings.
    pub terrain: TerrainConfig,
}

impl EngineConfig {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if the document is not valid
    /// TOML or a field has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        toml::from_str(text).map_err(|e| EngineError::InvalidInput {
            message: e.to_string(),
        })
    }
}

/// Tuning for one assessment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessOptions {
    /// Days of recent data the models score against.
    pub history_days: u32,
    /// Days of history fetched to establish baselines, ending at the
    /// assessment date. Must cover `history_days`.
    pub baseline_days: u32,
    /// Maximum in-flight element assessments for grid and series batches.
    pub concurrency: usize,
    /// How long computed assessments stay cached.
    pub cache_ttl_seconds: u64,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            history_days: 30,
            baseline_days: 365,
            concurrency: 4,
            cache_ttl_seconds: 3600,
        }
    }
}

impl AssessOptions {
    /// The cache TTL as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

/// The orchestrator behind every assessment entry point.
pub struct RiskEngine {
    weather: Arc<dyn WeatherProvider>,
    terrain: Arc<dyn TerrainProvider>,
    cache: Arc<dyn ResultCache>,
    detector: AnomalyDetector,
    flood: FloodModel,
    drought: DroughtModel,
    landslide: LandslideModel,
    composite: CompositeIndex,
    geodesic: Geodesic,
    interpolator: Interpolator,
}

impl RiskEngine {
    /// Builds an engine from configuration plus injected collaborators.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        weather: Arc<dyn WeatherProvider>,
        terrain: Arc<dyn TerrainProvider>,
        cache: Arc<dyn ResultCache>,
    ) -> Self {
        Self {
            weather,
            terrain,
            cache,
            detector: AnomalyDetector::new(config.anomaly),
            flood: FloodModel::new(config.flood),
            drought: DroughtModel::new(config.drought),
            landslide: LandslideModel::new(config.landslide),
            composite: CompositeIndex::new(config.composite),
            geodesic: Geodesic::new(config.geometry),
            interpolator: Interpolator::new(Geodesic::new(config.geometry), config.idw),
        }
    }

    /// Assesses one location as of today.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for an out-of-range coordinate
    /// or unusable options, and [`EngineError::DataUnavailable`] when the
    /// weather history cannot be fetched.
    pub async fn assess_point(
        &self,
        coordinate: Coordinate,
        options: &AssessOptions,
    ) -> Result<RiskAssessment, EngineError> {
        validate_options(options)?;
        validate_coordinate(coordinate)?;

        self.assess_dated(coordinate, Utc::now().date_naive(), options)
            .await
    }

    /// Assesses every point of a uniform `(grid_size + 1)²` lattice over
    /// `bbox`, as of today.
    ///
    /// Cells are assessed concurrently (bounded by `options.concurrency`)
    /// and are returned in completion order. A failing cell is logged and
    /// dropped, so the result may hold fewer cells than the lattice.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a degenerate bounding box,
    /// a zero grid size, or unusable options. Per-cell failures never fail
    /// the batch.
    pub async fn assess_grid(
        &self,
        bbox: BoundingBox,
        grid_size: usize,
        options: &AssessOptions,
    ) -> Result<Vec<GridAssessment>, EngineError> {
        validate_options(options)?;
        if grid_size == 0 {
            return Err(EngineError::InvalidInput {
                message: "grid_size must be at least 1".to_string(),
            });
        }
        if bbox.north <= bbox.south || bbox.east <= bbox.west {
            return Err(EngineError::InvalidInput {
                message: format!(
                    "degenerate bounding box: north={}, south={}, east={}, west={}",
                    bbox.north, bbox.south, bbox.east, bbox.west
                ),
            });
        }

        let date = Utc::now().date_naive();
        let cells: Vec<Option<GridAssessment>> =
            futures::stream::iter(self.geodesic.grid(bbox, grid_size).into_iter().map(
                |point| async move {
                    match self.assess_dated(point, date, options).await {
                        Ok(assessment) => Some(GridAssessment {
                            coordinates: point,
                            assessment,
                        }),
                        Err(e) => {
                            log::warn!(
                                "Dropping grid cell at lat={}, lon={}: {e}",
                                point.lat,
                                point.lon
                            );
                            None
                        }
                    }
                },
            ))
            .buffer_unordered(options.concurrency)
            .collect()
            .await;

        Ok(cells.into_iter().flatten().collect())
    }

    /// Assesses one location at each date stepped `interval_days` apart
    /// through `range`, inclusive of the start.
    ///
    /// Steps run concurrently but the result is date-ordered. A failing
    /// step is logged and dropped, so the result may hold fewer steps than
    /// the range covers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for an out-of-range
    /// coordinate, a zero interval, or unusable options. Per-step failures
    /// never fail the batch.
    pub async fn assess_time_series(
        &self,
        coordinate: Coordinate,
        range: &DateRange,
        interval_days: u32,
        options: &AssessOptions,
    ) -> Result<Vec<DatedAssessment>, EngineError> {
        validate_options(options)?;
        validate_coordinate(coordinate)?;
        if interval_days == 0 {
            return Err(EngineError::InvalidInput {
                message: "interval_days must be at least 1".to_string(),
            });
        }

        let mut dates = Vec::new();
        let mut date = range.start;
        while date <= range.end {
            dates.push(date);
            let Some(next) = date.checked_add_days(Days::new(u64::from(interval_days))) else {
                break;
            };
            date = next;
        }

        let mut steps: Vec<DatedAssessment> =
            futures::stream::iter(dates.into_iter().map(|date| async move {
                match self.assess_dated(coordinate, date, options).await {
                    Ok(assessment) => Some(DatedAssessment { date, assessment }),
                    Err(e) => {
                        log::warn!("Dropping series step {date}: {e}");
                        None
                    }
                }
            }))
            .buffer_unordered(options.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        steps.sort_by_key(|step| step.date);

        Ok(steps)
    }

    /// Interpolates assessed grid cells into a denser overall-risk surface.
    ///
    /// The (usually coarse) assessed lattice becomes one estimated sample
    /// per point of a `resolution`-sized grid over the same box, suitable
    /// for heatmap rendering.
    #[must_use]
    pub fn risk_surface(
        &self,
        bbox: BoundingBox,
        resolution: usize,
        cells: &[GridAssessment],
    ) -> Vec<SpatialSample> {
        let samples: Vec<SpatialSample> = cells
            .iter()
            .map(|cell| SpatialSample::new(cell.coordinates, cell.assessment.overall.value))
            .collect();

        self.interpolator.heatmap(bbox, resolution, &samples)
    }

    /// Cache-through assessment of one location as of `date`.
    async fn assess_dated(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
        options: &AssessOptions,
    ) -> Result<RiskAssessment, EngineError> {
        let key = point_cache_key(coordinate, date, options);

        if let Some(value) = self.cache_get(&key).await
            && let Ok(cached) = serde_json::from_value::<RiskAssessment>(value)
        {
            log::debug!("Cache hit: {key}");
            return Ok(cached);
        }

        let assessment = self.compute_assessment(coordinate, date, options).await?;

        match serde_json::to_value(&assessment) {
            Ok(value) => self.cache_set(&key, value, options.cache_ttl()).await,
            Err(e) => log::warn!("Assessment not cacheable: {e}"),
        }

        Ok(assessment)
    }

    async fn compute_assessment(
        &self,
        coordinate: Coordinate,
        date: NaiveDate,
        options: &AssessOptions,
    ) -> Result<RiskAssessment, EngineError> {
        let start = date
            .checked_sub_days(Days::new(u64::from(options.baseline_days) - 1))
            .ok_or_else(|| EngineError::InvalidInput {
                message: format!("assessment date {date} underflows the baseline span"),
            })?;
        let range = DateRange::new(start, date).map_err(|e| EngineError::InvalidInput {
            message: e.to_string(),
        })?;

        let weather = self
            .weather
            .fetch_history(coordinate, &range, &ASSESSMENT_FIELDS)
            .await?;

        // Terrain is optional input: the models score without it at
        // reduced confidence.
        let terrain = match self.terrain.fetch(coordinate).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!(
                    "Terrain fetch failed at lat={}, lon={}, scoring without elevation: {e}",
                    coordinate.lat,
                    coordinate.lon
                );
                None
            }
        };

        let inputs = inputs::derive(
            &weather,
            terrain.as_ref(),
            &self.detector,
            options.history_days,
        )?;

        let flood = self.flood.assess(&inputs.flood);
        let drought = self.drought.assess(&inputs.drought);
        let landslide = self.landslide.assess(&inputs.landslide);

        let overall_value = self.composite.compute(
            inputs.precipitation_anomaly,
            inputs.temperature_anomaly,
            inputs.vegetation_anomaly,
            flood.score.value,
            drought.score.value,
        );
        let confidence =
            (flood.score.confidence + drought.score.confidence + landslide.score.confidence) / 3.0;
        let overall = RiskScore::new(overall_value, confidence);

        let mut components = BTreeMap::new();
        components.insert(HazardKind::Flood, flood);
        components.insert(HazardKind::Drought, drought);
        components.insert(HazardKind::Landslide, landslide);

        Ok(RiskAssessment {
            location: coordinate,
            components,
            overall,
            generated_at: Utc::now(),
        })
    }

    async fn cache_get(&self, key: &str) -> Option<Value> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("Cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: Value, ttl: Duration) {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            log::warn!("Cache write failed, result not stored: {e}");
        }
    }
}

fn validate_options(options: &AssessOptions) -> Result<(), EngineError> {
    if options.history_days == 0 {
        return Err(EngineError::InvalidInput {
            message: "history_days must be at least 1".to_string(),
        });
    }
    if options.baseline_days < options.history_days {
        return Err(EngineError::InvalidInput {
            message: format!(
                "baseline_days ({}) must cover history_days ({})",
                options.baseline_days, options.history_days
            ),
        });
    }
    if options.concurrency == 0 {
        return Err(EngineError::InvalidInput {
            message: "concurrency must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_coordinate(coordinate: Coordinate) -> Result<(), EngineError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(EngineError::InvalidInput {
            message: format!(
                "coordinate out of range: lat={}, lon={}",
                coordinate.lat, coordinate.lon
            ),
        })
    }
}

/// One cache key per (location, date, window) triple. Coordinates are
/// rendered at 4 decimal places, roughly 11 m of locality.
fn point_cache_key(coordinate: Coordinate, date: NaiveDate, options: &AssessOptions) -> String {
    cache_key(
        "assessment",
        &[
            ("lat", format!("{:.4}", coordinate.lat)),
            ("lon", format!("{:.4}", coordinate.lon)),
            ("date", date.to_string()),
            ("history", options.history_days.to_string()),
            ("baseline", options.baseline_days.to_string()),
        ],
    )
}
