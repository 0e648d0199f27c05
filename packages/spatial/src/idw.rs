//! Inverse-distance-weighted interpolation.
//!
//! Estimates a value at an arbitrary point as the weighted mean of all
//! known samples, with weights `1 / d^power`. Closer observations dominate;
//! a query landing exactly on a sample returns that sample's value verbatim
//! instead of dividing by zero.

use hazard_map_geo_models::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};

use crate::{Geodesic, SpatialSample};

/// Interpolation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdwConfig {
    /// Distance exponent. Higher values localize the estimate around the
    /// nearest samples; 2 is the conventional choice.
    pub power: f64,
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self { power: 2.0 }
    }
}

/// Inverse-distance-weighted estimator over sparse geographic samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator {
    geodesic: Geodesic,
    config: IdwConfig,
}

impl Interpolator {
    #[must_use]
    pub const fn new(geodesic: Geodesic, config: IdwConfig) -> Self {
        Self { geodesic, config }
    }

    /// Estimates the value at `point` from the given samples.
    ///
    /// With no samples the estimate is `0.0`; with a single sample its
    /// value is returned regardless of distance. If `point` coincides
    /// exactly with a sample, that sample's value is returned unweighted.
    #[must_use]
    pub fn interpolate(&self, point: Coordinate, samples: &[SpatialSample]) -> f64 {
        match samples {
            [] => 0.0,
            [only] => only.value,
            _ => {
                let mut weighted_sum = 0.0;
                let mut weight_total = 0.0;

                for sample in samples {
                    let distance = self.geodesic.distance_km(point, sample.point);
                    if distance == 0.0 {
                        return sample.value;
                    }
                    let weight = distance.powf(self.config.power).recip();
                    weighted_sum = weight.mul_add(sample.value, weighted_sum);
                    weight_total += weight;
                }

                weighted_sum / weight_total
            }
        }
    }

    /// Interpolates every point of a uniform lattice over `bbox`, yielding
    /// one estimated sample per grid point.
    ///
    /// Output ordering follows [`Geodesic::grid`]: south-to-north rows,
    /// west-to-east within each row.
    #[must_use]
    pub fn heatmap(
        &self,
        bbox: BoundingBox,
        grid_size: usize,
        samples: &[SpatialSample],
    ) -> Vec<SpatialSample> {
        self.geodesic
            .grid(bbox, grid_size)
            .into_iter()
            .map(|point| SpatialSample::new(point, self.interpolate(point, samples)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpolator() -> Interpolator {
        Interpolator::default()
    }

    #[test]
    fn no_samples_estimates_zero() {
        let estimate = interpolator().interpolate(Coordinate::new(0.0, 0.0), &[]);

        assert!(estimate.abs() < f64::EPSILON);
    }

    #[test]
    fn single_sample_is_returned_verbatim() {
        let samples = [SpatialSample::new(Coordinate::new(10.0, 10.0), 42.5)];

        let estimate = interpolator().interpolate(Coordinate::new(-30.0, 80.0), &samples);

        assert!((estimate - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn coincident_query_returns_the_sample_value() {
        let samples = [
            SpatialSample::new(Coordinate::new(0.0, 0.0), 7.0),
            SpatialSample::new(Coordinate::new(1.0, 1.0), 100.0),
            SpatialSample::new(Coordinate::new(-1.0, 2.0), -3.0),
        ];

        let estimate = interpolator().interpolate(Coordinate::new(0.0, 0.0), &samples);

        assert!((estimate - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_stays_within_sample_range() {
        let samples = [
            SpatialSample::new(Coordinate::new(0.0, 0.0), 10.0),
            SpatialSample::new(Coordinate::new(0.0, 1.0), 20.0),
            SpatialSample::new(Coordinate::new(1.0, 0.0), 30.0),
        ];

        let estimate = interpolator().interpolate(Coordinate::new(0.4, 0.4), &samples);

        assert!(estimate > 10.0);
        assert!(estimate < 30.0);
    }

    #[test]
    fn closer_sample_dominates() {
        let samples = [
            SpatialSample::new(Coordinate::new(0.0, 0.1), 100.0),
            SpatialSample::new(Coordinate::new(0.0, 5.0), 0.0),
        ];

        let estimate = interpolator().interpolate(Coordinate::new(0.0, 0.0), &samples);

        assert!(estimate > 90.0);
    }

    #[test]
    fn heatmap_covers_every_grid_point() {
        let bbox = BoundingBox::new(1.0, -1.0, 31.0, 29.0);
        let samples = [
            SpatialSample::new(Coordinate::new(0.0, 30.0), 5.0),
            SpatialSample::new(Coordinate::new(0.5, 30.5), 9.0),
        ];

        let heatmap = interpolator().heatmap(bbox, 2, &samples);

        assert_eq!(heatmap.len(), 9);
        assert!(heatmap.iter().all(|s| s.value >= 5.0 && s.value <= 9.0));
    }
}
