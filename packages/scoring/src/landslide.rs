//! Landslide risk from slope, rainfall loading, saturation, and ground
//! cover.

use hazard_map_hazard_models::{HazardAssessment, RiskFactor, RiskScore};
use serde::{Deserialize, Serialize};

use crate::{input_confidence, rainfall_excess_fraction};

/// Weights and thresholds for the landslide model.
///
/// The four factor weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandslideConfig {
    pub slope_weight: f64,
    pub rainfall_weight: f64,
    pub soil_moisture_weight: f64,
    pub vegetation_weight: f64,
    /// Slope at which the slope factor saturates, degrees.
    pub critical_slope_degrees: f64,
    /// Rainfall at this multiple of the baseline saturates the rainfall
    /// factor.
    pub saturation_ratio: f64,
}

impl Default for LandslideConfig {
    fn default() -> Self {
        Self {
            slope_weight: 0.35,
            rainfall_weight: 0.30,
            soil_moisture_weight: 0.20,
            vegetation_weight: 0.15,
            critical_slope_degrees: 45.0,
            saturation_ratio: 2.5,
        }
    }
}

impl LandslideConfig {
    /// Sum of the four factor weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.slope_weight + self.rainfall_weight + self.soil_moisture_weight + self.vegetation_weight
    }
}

/// Physical inputs to the landslide model.
///
/// The rainfall pair is always required; optional fields contribute no
/// risk when absent and lower the result's confidence instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandslideInputs {
    /// Rainfall accumulated over the assessment window, millimeters.
    pub recent_rainfall_mm: f64,
    /// Typical rainfall for a full month at this location, millimeters.
    pub baseline_monthly_rainfall_mm: f64,
    /// Days covered by `recent_rainfall_mm`.
    pub window_days: u32,
    /// Terrain slope, degrees.
    pub slope_degrees: Option<f64>,
    /// Topsoil volumetric moisture as a 0-1 fraction.
    pub soil_moisture: Option<f64>,
    /// Vegetation index as a 0-1 fraction.
    pub vegetation_index: Option<f64>,
}

/// Scores landslide risk as a weighted sum of normalized sub-factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LandslideModel {
    config: LandslideConfig,
}

impl LandslideModel {
    #[must_use]
    pub fn new(config: LandslideConfig) -> Self {
        debug_assert!(
            (config.weight_sum() - 1.0).abs() < 1e-9,
            "landslide factor weights must sum to 1.0"
        );
        debug_assert!(config.critical_slope_degrees > 0.0);
        debug_assert!(config.saturation_ratio > 1.0);
        Self { config }
    }

    /// Scores the given inputs.
    ///
    /// Pure function: identical inputs always yield the identical score
    /// and factor list.
    #[must_use]
    pub fn assess(&self, inputs: &LandslideInputs) -> HazardAssessment {
        let mut factors: Vec<RiskFactor> = Vec::new();

        let slope_factor = inputs.slope_degrees.map_or(0.0, |slope| {
            (slope / self.config.critical_slope_degrees).clamp(0.0, 1.0)
        });
        if slope_factor > 0.5
            && let Some(slope) = inputs.slope_degrees
        {
            factors.push(format!("steep slope at {slope:.0} degrees"));
        }

        let excess = rainfall_excess_fraction(
            inputs.recent_rainfall_mm,
            inputs.baseline_monthly_rainfall_mm,
            inputs.window_days,
        );
        let rainfall_factor = (excess / (self.config.saturation_ratio - 1.0)).clamp(0.0, 1.0);
        if rainfall_factor > 0.5 {
            factors.push("heavy rainfall loading".to_string());
        }

        let saturation_factor = inputs.soil_moisture.map_or(0.0, |m| m.clamp(0.0, 1.0));
        if saturation_factor > 0.7 {
            factors.push("saturated topsoil".to_string());
        }

        let cover_factor = inputs
            .vegetation_index
            .map_or(0.0, |v| 1.0 - v.clamp(0.0, 1.0));
        if cover_factor > 0.6 {
            factors.push("sparse vegetation cover".to_string());
        }

        let weighted: f64 = [
            (slope_factor, self.config.slope_weight),
            (rainfall_factor, self.config.rainfall_weight),
            (saturation_factor, self.config.soil_moisture_weight),
            (cover_factor, self.config.vegetation_weight),
        ]
        .iter()
        .map(|(factor, weight)| factor * weight)
        .sum();

        let confidence = input_confidence(
            2,
            &[
                inputs.slope_degrees.is_some(),
                inputs.soil_moisture.is_some(),
                inputs.vegetation_index.is_some(),
            ],
        );

        HazardAssessment {
            score: RiskScore::new(weighted, confidence),
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use hazard_map_hazard_models::RiskLevel;

    use super::*;

    fn model() -> LandslideModel {
        LandslideModel::default()
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!((LandslideConfig::default().weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn soaked_steep_bare_slope_scores_extreme() {
        let inputs = LandslideInputs {
            recent_rainfall_mm: 220.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            slope_degrees: Some(40.0),
            soil_moisture: Some(0.85),
            vegetation_index: Some(0.15),
        };

        let assessment = model().assess(&inputs);

        assert!(assessment.score.value > 0.75);
        assert_eq!(assessment.score.level, RiskLevel::Extreme);
        assert!(
            assessment
                .factors
                .iter()
                .any(|f| f.contains("steep slope"))
        );
        assert!(
            assessment
                .factors
                .iter()
                .any(|f| f == "sparse vegetation cover")
        );
    }

    #[test]
    fn flat_dry_vegetated_ground_scores_low() {
        let inputs = LandslideInputs {
            recent_rainfall_mm: 40.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            slope_degrees: Some(3.0),
            soil_moisture: Some(0.3),
            vegetation_index: Some(0.9),
        };

        let assessment = model().assess(&inputs);

        assert!(assessment.score.value < 0.25);
        assert_eq!(assessment.score.level, RiskLevel::Low);
    }

    #[test]
    fn slope_alone_cannot_reach_extreme() {
        let inputs = LandslideInputs {
            recent_rainfall_mm: 30.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            slope_degrees: Some(60.0),
            soil_moisture: Some(0.0),
            vegetation_index: Some(1.0),
        };

        let assessment = model().assess(&inputs);

        assert!((assessment.score.value - 0.35).abs() < 1e-9);
        assert_eq!(assessment.score.level, RiskLevel::Medium);
    }

    #[test]
    fn sweep_stays_bounded_and_classified() {
        let landslide = model();
        let mut seed = 0xda3e_39cb_94b9_5bdb_u64;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let unit = |shift: u32| {
                #[allow(clippy::cast_precision_loss)]
                let raw = ((seed >> shift) & 0xffff) as f64 / f64::from(0xffff_u16);
                raw
            };

            let inputs = LandslideInputs {
                recent_rainfall_mm: unit(0) * 400.0,
                baseline_monthly_rainfall_mm: unit(8) * 200.0,
                window_days: 30,
                slope_degrees: (seed & 1 == 0).then(|| unit(16) * 70.0),
                soil_moisture: (seed & 2 == 0).then(|| unit(24)),
                vegetation_index: (seed & 4 == 0).then(|| unit(32)),
            };

            let assessment = landslide.assess(&inputs);

            assert!((0.0..=1.0).contains(&assessment.score.value));
            assert_eq!(
                assessment.score.level,
                RiskLevel::from_score(assessment.score.value)
            );
            assert!((0.0..=1.0).contains(&assessment.score.confidence));
        }
    }
}
