//! Z-score anomaly detection against a historical series.

use hazard_map_hazard_models::{AnomalyResult, AnomalySeverity};
use serde::{Deserialize, Serialize};

/// Detection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnomalyConfig {
    /// Minimum |z| for an observation to be flagged anomalous.
    pub threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self { threshold: 2.0 }
    }
}

/// Scores observations against their own history.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    #[must_use]
    pub const fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Compares `value` against `history`.
    ///
    /// An empty or constant history has no spread to measure against and
    /// yields a zero anomaly. The result never carries NaN or infinities,
    /// including when the observation itself is non-finite.
    #[must_use]
    pub fn calculate(&self, value: f64, history: &[f64]) -> AnomalyResult {
        let std_dev = population_variance(history).sqrt();
        let anomaly = if history.is_empty() || std_dev == 0.0 {
            0.0
        } else {
            let z = (value - mean(history)) / std_dev;
            if z.is_finite() { z } else { 0.0 }
        };

        AnomalyResult {
            value,
            anomaly,
            percentile_rank: percentile_rank(value, history),
            is_anomaly: anomaly.abs() > self.config.threshold,
            severity: AnomalySeverity::from_z_score(anomaly),
        }
    }
}

/// Arithmetic mean. Zero for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    values.iter().sum::<f64>() / count
}

/// Population variance, dividing by N rather than N-1. Zero for an empty
/// slice.
#[must_use]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = mean(values);
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count
}

/// Percentage of `history` strictly below `value`, in [0, 100].
///
/// Rank-based rather than interpolated, which is accurate enough for
/// bucketing and avoids sorting. An empty history ranks at 0.
#[must_use]
pub fn percentile_rank(value: f64, history: &[f64]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }

    let below = history.iter().filter(|v| **v < value).count();
    #[allow(clippy::cast_precision_loss)]
    let fraction = below as f64 / history.len() as f64;
    fraction * 100.0
}
