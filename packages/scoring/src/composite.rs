//! Fixed-weight aggregation of anomalies and hazard scores into one
//! composite climate risk score.

use serde::{Deserialize, Serialize};

/// Weights for the composite index.
///
/// The five weights must sum to 1.0; [`CompositeIndex::new`] asserts it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositeConfig {
    pub precipitation_weight: f64,
    pub temperature_weight: f64,
    pub vegetation_weight: f64,
    pub flood_weight: f64,
    pub drought_weight: f64,
    /// Anomaly magnitude (in standard deviations) treated as the practical
    /// maximum; larger deviations saturate at 1.0.
    pub anomaly_saturation: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            precipitation_weight: 0.25,
            temperature_weight: 0.20,
            vegetation_weight: 0.20,
            flood_weight: 0.20,
            drought_weight: 0.15,
            anomaly_saturation: 3.0,
        }
    }
}

impl CompositeConfig {
    /// Sum of the five weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.precipitation_weight
            + self.temperature_weight
            + self.vegetation_weight
            + self.flood_weight
            + self.drought_weight
    }
}

/// Combines independently-derived risk signals into a single scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeIndex {
    config: CompositeConfig,
}

impl CompositeIndex {
    #[must_use]
    pub fn new(config: CompositeConfig) -> Self {
        debug_assert!(
            (config.weight_sum() - 1.0).abs() < 1e-9,
            "composite weights must sum to 1.0"
        );
        debug_assert!(config.anomaly_saturation > 0.0);
        Self { config }
    }

    /// Computes the composite score in [0, 1].
    ///
    /// Anomalies are taken by magnitude and normalized against the
    /// saturation point; hazard scores are expected already in [0, 1] and
    /// clamped regardless. Monotonic non-decreasing in every input.
    #[must_use]
    pub fn compute(
        &self,
        precipitation_anomaly: f64,
        temperature_anomaly: f64,
        vegetation_anomaly: f64,
        flood_score: f64,
        drought_score: f64,
    ) -> f64 {
        let score: f64 = [
            (
                self.normalize_anomaly(precipitation_anomaly),
                self.config.precipitation_weight,
            ),
            (
                self.normalize_anomaly(temperature_anomaly),
                self.config.temperature_weight,
            ),
            (
                self.normalize_anomaly(vegetation_anomaly),
                self.config.vegetation_weight,
            ),
            (flood_score.clamp(0.0, 1.0), self.config.flood_weight),
            (drought_score.clamp(0.0, 1.0), self.config.drought_weight),
        ]
        .iter()
        .map(|(signal, weight)| signal * weight)
        .sum();

        score.clamp(0.0, 1.0)
    }

    fn normalize_anomaly(&self, z: f64) -> f64 {
        if !z.is_finite() {
            return 0.0;
        }

        (z.abs() / self.config.anomaly_saturation).min(1.0)
    }
}
