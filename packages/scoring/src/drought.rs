//! Drought risk from rainfall deficit, soil dryness, vegetation stress,
//! and heat.

use hazard_map_hazard_models::{HazardAssessment, RiskFactor, RiskScore};
use serde::{Deserialize, Serialize};

use crate::{input_confidence, rainfall_deficit_fraction};

/// Weights and thresholds for the drought model.
///
/// The four factor weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DroughtConfig {
    pub deficit_weight: f64,
    pub soil_moisture_weight: f64,
    pub vegetation_weight: f64,
    pub temperature_weight: f64,
    /// Temperature anomaly (z-score) at which the heat factor saturates.
    pub heat_saturation_z: f64,
}

impl Default for DroughtConfig {
    fn default() -> Self {
        Self {
            deficit_weight: 0.40,
            soil_moisture_weight: 0.25,
            vegetation_weight: 0.20,
            temperature_weight: 0.15,
            heat_saturation_z: 3.0,
        }
    }
}

impl DroughtConfig {
    /// Sum of the four factor weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.deficit_weight
            + self.soil_moisture_weight
            + self.vegetation_weight
            + self.temperature_weight
    }
}

/// Physical inputs to the drought model.
///
/// The rainfall pair is always required; optional fields contribute no
/// risk when absent and lower the result's confidence instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroughtInputs {
    /// Rainfall accumulated over the assessment window, millimeters.
    pub recent_rainfall_mm: f64,
    /// Typical rainfall for a full month at this location, millimeters.
    pub baseline_monthly_rainfall_mm: f64,
    /// Days covered by `recent_rainfall_mm`.
    pub window_days: u32,
    /// Topsoil volumetric moisture as a 0-1 fraction.
    pub soil_moisture: Option<f64>,
    /// Temperature anomaly of the window against history, as a z-score.
    pub temperature_anomaly: Option<f64>,
    /// Vegetation index as a 0-1 fraction.
    pub vegetation_index: Option<f64>,
}

/// Scores drought risk as a weighted sum of normalized sub-factors.
///
/// Reads the same rainfall series as the flood model but inverse-signed:
/// only a shortfall against the baseline raises the deficit factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DroughtModel {
    config: DroughtConfig,
}

impl DroughtModel {
    #[must_use]
    pub fn new(config: DroughtConfig) -> Self {
        debug_assert!(
            (config.weight_sum() - 1.0).abs() < 1e-9,
            "drought factor weights must sum to 1.0"
        );
        debug_assert!(config.heat_saturation_z > 0.0);
        Self { config }
    }

    /// Scores the given inputs.
    ///
    /// Pure function: identical inputs always yield the identical score
    /// and factor list.
    #[must_use]
    pub fn assess(&self, inputs: &DroughtInputs) -> HazardAssessment {
        let mut factors: Vec<RiskFactor> = Vec::new();

        let deficit = rainfall_deficit_fraction(
            inputs.recent_rainfall_mm,
            inputs.baseline_monthly_rainfall_mm,
            inputs.window_days,
        );
        if deficit > 0.5 {
            factors.push(format!(
                "rainfall {:.0}% below seasonal baseline",
                deficit * 100.0
            ));
        }

        let dryness_factor = inputs
            .soil_moisture
            .map_or(0.0, |m| 1.0 - m.clamp(0.0, 1.0));
        if dryness_factor > 0.7 {
            factors.push("critically dry topsoil".to_string());
        }

        let stress_factor = inputs
            .vegetation_index
            .map_or(0.0, |v| 1.0 - v.clamp(0.0, 1.0));
        if stress_factor > 0.6 {
            factors.push("stressed vegetation".to_string());
        }

        let heat_factor = inputs.temperature_anomaly.map_or(0.0, |z| {
            (z / self.config.heat_saturation_z).clamp(0.0, 1.0)
        });
        if heat_factor > 0.5 {
            factors.push("sustained above-normal temperatures".to_string());
        }

        let weighted: f64 = [
            (deficit, self.config.deficit_weight),
            (dryness_factor, self.config.soil_moisture_weight),
            (stress_factor, self.config.vegetation_weight),
            (heat_factor, self.config.temperature_weight),
        ]
        .iter()
        .map(|(factor, weight)| factor * weight)
        .sum();

        let confidence = input_confidence(
            2,
            &[
                inputs.soil_moisture.is_some(),
                inputs.temperature_anomaly.is_some(),
                inputs.vegetation_index.is_some(),
            ],
        );

        HazardAssessment {
            score: RiskScore::new(weighted, confidence),
            factors,
        }
    }
}
