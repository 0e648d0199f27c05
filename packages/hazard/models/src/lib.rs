#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hazard taxonomy and risk classification types.
//!
//! This crate defines the canonical hazard categories and the shared
//! four-level risk classification used across the hazard-map system. Every
//! risk model and the composite combiner classify scores through the same
//! breakpoints defined here.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use hazard_map_geo_models::Coordinate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Discrete risk classification, from 1 (low) to 4 (extreme).
///
/// Derived from a continuous score in [0, 1] via the shared breakpoints
/// [`RiskLevel::BREAKPOINTS`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Score below 0.25: routine conditions.
    Low = 1,
    /// Score in [0.25, 0.5): elevated conditions worth monitoring.
    Medium = 2,
    /// Score in [0.5, 0.75): hazardous conditions likely.
    High = 3,
    /// Score at or above 0.75: severe conditions expected.
    Extreme = 4,
}

impl RiskLevel {
    /// Score breakpoints separating the four levels, ascending.
    ///
    /// A score at or above a breakpoint belongs to the bucket above it.
    pub const BREAKPOINTS: [f64; 3] = [0.25, 0.5, 0.75];

    /// Classifies a score in [0, 1] into a level.
    ///
    /// Out-of-range scores are clamped first, so the mapping is total.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        let score = score.clamp(0.0, 1.0);
        if score >= Self::BREAKPOINTS[2] {
            Self::Extreme
        } else if score >= Self::BREAKPOINTS[1] {
            Self::High
        } else if score >= Self::BREAKPOINTS[0] {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns the numeric rank of this level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a level from a numeric rank.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-4.
    pub const fn from_value(value: u8) -> Result<Self, InvalidLevelError> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Extreme),
            _ => Err(InvalidLevelError { value }),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Extreme]
    }
}

/// Error returned when attempting to create a [`RiskLevel`] from an invalid
/// numeric rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLevelError {
    /// The invalid rank that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid risk level value {}: expected 1-4", self.value)
    }
}

impl std::error::Error for InvalidLevelError {}

/// Severity bucket for a statistical anomaly, derived from the magnitude of
/// its z-score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalySeverity {
    /// |z| ≤ 1: within one standard deviation of the historical mean.
    Low,
    /// 1 < |z| ≤ 2: notable deviation.
    Medium,
    /// 2 < |z| ≤ 3: strong deviation.
    High,
    /// |z| > 3: extreme deviation.
    Extreme,
}

impl AnomalySeverity {
    /// Classifies a z-score by magnitude using the fixed {1, 2, 3}
    /// breakpoints.
    #[must_use]
    pub fn from_z_score(z: f64) -> Self {
        let magnitude = z.abs();
        if magnitude > 3.0 {
            Self::Extreme
        } else if magnitude > 2.0 {
            Self::High
        } else if magnitude > 1.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// The hazard categories the engine scores.
///
/// A closed set: adding a hazard means adding a variant here, a scoring
/// model, and a weight in the composite combiner.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    /// Riverine/pluvial flooding driven by rainfall excess.
    Flood,
    /// Sustained rainfall deficit and moisture stress.
    Drought,
    /// Slope failure driven by rainfall loading on steep terrain.
    Landslide,
}

impl HazardKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Flood, Self::Drought, Self::Landslide]
    }
}

/// A bounded risk score with its derived classification.
///
/// `level` is always consistent with `value`; construct through
/// [`RiskScore::new`] rather than building the struct literally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    /// Continuous score, clamped to [0, 1].
    pub value: f64,
    /// Discrete classification of `value`.
    pub level: RiskLevel,
    /// How complete the inputs behind this score were, in [0, 1].
    pub confidence: f64,
}

impl RiskScore {
    /// Builds a score, clamping `value` and `confidence` to [0, 1] and
    /// deriving the level.
    #[must_use]
    pub fn new(value: f64, confidence: f64) -> Self {
        let value = if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            value,
            level: RiskLevel::from_score(value),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

/// Result of comparing one observation against its historical series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyResult {
    /// The observed value.
    pub value: f64,
    /// z-score of the observation against the historical mean, 0 when the
    /// history is constant or empty.
    pub anomaly: f64,
    /// Percentage of historical values strictly below the observation
    /// (rank-based, not an interpolated percentile).
    pub percentile_rank: f64,
    /// Whether |z| exceeded the configured anomaly threshold.
    pub is_anomaly: bool,
    /// Severity bucket of |z|.
    pub severity: AnomalySeverity,
}

/// One dated observation from a historical series. Series are immutable
/// inputs; the engine never mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesSample {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
}

/// A human-readable contributing factor behind a hazard score.
///
/// Generated deterministically from crossed sub-thresholds, so identical
/// inputs always yield the identical list.
pub type RiskFactor = String;

/// Score plus the deterministic explanation of how it came about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardAssessment {
    /// The hazard's bounded score and classification.
    pub score: RiskScore,
    /// Contributing factors, one per crossed sub-threshold.
    pub factors: Vec<RiskFactor>,
}

/// Complete risk assessment for one location at one point in time.
///
/// Owned solely by the requesting caller; never shared or mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// The assessed location.
    pub location: Coordinate,
    /// Per-hazard scores, keyed by the closed hazard set.
    pub components: BTreeMap<HazardKind, HazardAssessment>,
    /// Weighted composite of all components and anomalies.
    pub overall: RiskScore,
    /// When the assessment was computed.
    pub generated_at: DateTime<Utc>,
}

/// One cell of a grid assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridAssessment {
    /// The grid cell's coordinate.
    pub coordinates: Coordinate,
    /// The assessment computed for that coordinate.
    pub assessment: RiskAssessment,
}

/// One step of a time-series assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedAssessment {
    /// The date the assessment window ended on.
    pub date: NaiveDate,
    /// The assessment computed for that date.
    pub assessment: RiskAssessment,
}
