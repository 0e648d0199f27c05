//! Flood risk from rainfall excess, soil saturation, and drainage proxies.

use hazard_map_hazard_models::{HazardAssessment, RiskFactor, RiskScore};
use serde::{Deserialize, Serialize};

use crate::{input_confidence, rainfall_excess_fraction};

/// Weights and thresholds for the flood model.
///
/// The four factor weights must sum to 1.0 and `saturation_ratio` must
/// exceed 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloodConfig {
    pub rainfall_weight: f64,
    pub soil_moisture_weight: f64,
    pub elevation_weight: f64,
    pub slope_weight: f64,
    /// Relief subtracted for fully healthy vegetation cover.
    pub vegetation_relief: f64,
    /// Rainfall at this multiple of the baseline saturates the rainfall
    /// factor.
    pub saturation_ratio: f64,
    /// Elevation above which drainage is assumed unconstrained, meters.
    pub drainage_elevation_m: f64,
    /// Slope above which ponding is assumed impossible, degrees.
    pub ponding_slope_degrees: f64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            rainfall_weight: 0.40,
            soil_moisture_weight: 0.25,
            elevation_weight: 0.20,
            slope_weight: 0.15,
            vegetation_relief: 0.10,
            saturation_ratio: 2.5,
            drainage_elevation_m: 2000.0,
            ponding_slope_degrees: 15.0,
        }
    }
}

impl FloodConfig {
    /// Sum of the four factor weights.
    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.rainfall_weight + self.soil_moisture_weight + self.elevation_weight + self.slope_weight
    }
}

/// Physical inputs to the flood model.
///
/// The rainfall pair is always required; optional fields contribute no
/// risk when absent and lower the result's confidence instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodInputs {
    /// Rainfall accumulated over the assessment window, millimeters.
    pub recent_rainfall_mm: f64,
    /// Typical rainfall for a full month at this location, millimeters.
    pub baseline_monthly_rainfall_mm: f64,
    /// Days covered by `recent_rainfall_mm`.
    pub window_days: u32,
    /// Topsoil volumetric moisture as a 0-1 fraction.
    pub soil_moisture: Option<f64>,
    /// Elevation above sea level, meters.
    pub elevation_m: Option<f64>,
    /// Terrain slope, degrees.
    pub slope_degrees: Option<f64>,
    /// Vegetation index as a 0-1 fraction.
    pub vegetation_index: Option<f64>,
}

/// Scores flood risk as a weighted sum of normalized sub-factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodModel {
    config: FloodConfig,
}

impl FloodModel {
    #[must_use]
    pub fn new(config: FloodConfig) -> Self {
        debug_assert!(
            (config.weight_sum() - 1.0).abs() < 1e-9,
            "flood factor weights must sum to 1.0"
        );
        debug_assert!(config.saturation_ratio > 1.0);
        Self { config }
    }

    /// Scores the given inputs.
    ///
    /// Pure function: identical inputs always yield the identical score
    /// and factor list.
    #[must_use]
    pub fn assess(&self, inputs: &FloodInputs) -> HazardAssessment {
        let mut factors: Vec<RiskFactor> = Vec::new();

        let excess = rainfall_excess_fraction(
            inputs.recent_rainfall_mm,
            inputs.baseline_monthly_rainfall_mm,
            inputs.window_days,
        );
        let rainfall_factor = (excess / (self.config.saturation_ratio - 1.0)).clamp(0.0, 1.0);
        if rainfall_factor > 0.5 {
            factors.push(format!(
                "rainfall {:.0}% above seasonal baseline",
                excess * 100.0
            ));
        }

        let soil_factor = inputs.soil_moisture.map_or(0.0, |m| m.clamp(0.0, 1.0));
        if soil_factor > 0.7 {
            factors.push("saturated topsoil".to_string());
        }

        let elevation_factor = inputs.elevation_m.map_or(0.0, |elevation| {
            (1.0 - elevation / self.config.drainage_elevation_m).clamp(0.0, 1.0)
        });
        if elevation_factor > 0.7 {
            factors.push("low-lying terrain".to_string());
        }

        let slope_factor = inputs.slope_degrees.map_or(0.0, |slope| {
            (1.0 - slope / self.config.ponding_slope_degrees).clamp(0.0, 1.0)
        });
        if slope_factor > 0.7 {
            factors.push("flat terrain with poor drainage".to_string());
        }

        let relief = inputs
            .vegetation_index
            .map_or(0.0, |v| v.clamp(0.0, 1.0) * self.config.vegetation_relief);
        if relief > self.config.vegetation_relief * 0.6 {
            factors.push("dense vegetation cover (risk reduced)".to_string());
        }

        let weighted: f64 = [
            (rainfall_factor, self.config.rainfall_weight),
            (soil_factor, self.config.soil_moisture_weight),
            (elevation_factor, self.config.elevation_weight),
            (slope_factor, self.config.slope_weight),
        ]
        .iter()
        .map(|(factor, weight)| factor * weight)
        .sum();

        let confidence = input_confidence(
            2,
            &[
                inputs.soil_moisture.is_some(),
                inputs.elevation_m.is_some(),
                inputs.slope_degrees.is_some(),
                inputs.vegetation_index.is_some(),
            ],
        );

        HazardAssessment {
            score: RiskScore::new(weighted - relief, confidence),
            factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use hazard_map_hazard_models::RiskLevel;

    use super::*;

    fn model() -> FloodModel {
        FloodModel::default()
    }

    fn wet_lowland() -> FloodInputs {
        FloodInputs {
            recent_rainfall_mm: 240.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            soil_moisture: Some(0.9),
            elevation_m: Some(100.0),
            slope_degrees: Some(2.0),
            vegetation_index: None,
        }
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!((FloodConfig::default().weight_sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_lowland_scores_extreme() {
        let assessment = model().assess(&wet_lowland());

        assert!(assessment.score.value > 0.75);
        assert_eq!(assessment.score.level, RiskLevel::Extreme);
        assert!(
            assessment
                .factors
                .iter()
                .any(|f| f.contains("above seasonal baseline"))
        );
        assert!(assessment.factors.iter().any(|f| f == "saturated topsoil"));
        assert!(assessment.factors.iter().any(|f| f == "low-lying terrain"));
    }

    #[test]
    fn dry_highland_scores_low() {
        let inputs = FloodInputs {
            recent_rainfall_mm: 20.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            soil_moisture: Some(0.2),
            elevation_m: Some(1800.0),
            slope_degrees: Some(14.0),
            vegetation_index: Some(0.5),
        };

        let assessment = model().assess(&inputs);

        assert!(assessment.score.value < 0.25);
        assert_eq!(assessment.score.level, RiskLevel::Low);
    }

    #[test]
    fn healthy_vegetation_reduces_the_score() {
        let bare = model().assess(&wet_lowland());
        let vegetated = model().assess(&FloodInputs {
            vegetation_index: Some(1.0),
            ..wet_lowland()
        });

        assert!(vegetated.score.value < bare.score.value);
        assert!((bare.score.value - vegetated.score.value - 0.10).abs() < 1e-9);
    }

    #[test]
    fn missing_optionals_lower_confidence_not_panic() {
        let inputs = FloodInputs {
            recent_rainfall_mm: 100.0,
            baseline_monthly_rainfall_mm: 90.0,
            window_days: 30,
            soil_moisture: None,
            elevation_m: None,
            slope_degrees: None,
            vegetation_index: None,
        };

        let assessment = model().assess(&inputs);

        assert!((assessment.score.confidence - 2.0 / 6.0).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&assessment.score.value));
    }

    #[test]
    fn identical_inputs_yield_identical_assessments() {
        let first = model().assess(&wet_lowland());
        let second = model().assess(&wet_lowland());

        assert_eq!(first, second);
    }

    #[test]
    fn sweep_stays_bounded_and_classified() {
        let flood = model();
        let mut seed = 0x9e37_79b9_7f4a_7c15_u64;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let unit = |shift: u32| {
                #[allow(clippy::cast_precision_loss)]
                let raw = ((seed >> shift) & 0xffff) as f64 / f64::from(0xffff_u16);
                raw
            };

            let inputs = FloodInputs {
                recent_rainfall_mm: unit(0) * 400.0,
                baseline_monthly_rainfall_mm: unit(8) * 200.0,
                window_days: 30,
                soil_moisture: (seed & 1 == 0).then(|| unit(16)),
                elevation_m: (seed & 2 == 0).then(|| unit(24) * 3000.0),
                slope_degrees: (seed & 4 == 0).then(|| unit(32) * 60.0),
                vegetation_index: (seed & 8 == 0).then(|| unit(40)),
            };

            let assessment = flood.assess(&inputs);

            assert!((0.0..=1.0).contains(&assessment.score.value));
            assert_eq!(
                assessment.score.level,
                RiskLevel::from_score(assessment.score.value)
            );
            assert!((0.0..=1.0).contains(&assessment.score.confidence));
        }
    }
}
