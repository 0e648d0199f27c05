//! Slope and aspect from cardinal elevation probes.
//!
//! Terrain profiles need only the local gradient, estimated here with
//! central differences over four elevations sampled around the point of
//! interest. Slope is the gradient magnitude expressed in degrees from
//! horizontal; aspect is the compass bearing of the downslope direction.

use serde::{Deserialize, Serialize};

/// Gradient magnitudes below tan(0.01 degrees) are treated as flat.
const FLAT_GRADIENT_THRESHOLD: f64 = 1.745e-4;

/// Elevations sampled at the four cardinal points around a location.
///
/// Spans are the ground distances between opposite probe points and must
/// be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationProbe {
    /// Elevation at the northern probe point, meters.
    pub north_m: f64,
    /// Elevation at the southern probe point, meters.
    pub south_m: f64,
    /// Elevation at the eastern probe point, meters.
    pub east_m: f64,
    /// Elevation at the western probe point, meters.
    pub west_m: f64,
    /// Ground distance between the north and south probe points, meters.
    pub ns_span_m: f64,
    /// Ground distance between the east and west probe points, meters.
    pub ew_span_m: f64,
}

impl ElevationProbe {
    /// Eastward and northward elevation gradients, as rise over run.
    #[must_use]
    pub fn gradient(&self) -> (f64, f64) {
        let dz_dx = (self.east_m - self.west_m) / self.ew_span_m;
        let dz_dy = (self.north_m - self.south_m) / self.ns_span_m;
        (dz_dx, dz_dy)
    }

    /// Steepest incline in degrees from horizontal.
    #[must_use]
    pub fn slope_degrees(&self) -> f64 {
        let (dz_dx, dz_dy) = self.gradient();

        dz_dx.hypot(dz_dy).atan().to_degrees()
    }

    /// Compass bearing of the downslope direction, degrees clockwise from
    /// north, in `[0, 360)`. Flat terrain reports `0.0`.
    #[must_use]
    pub fn aspect_degrees(&self) -> f64 {
        let (dz_dx, dz_dy) = self.gradient();
        if dz_dx.hypot(dz_dy) < FLAT_GRADIENT_THRESHOLD {
            return 0.0;
        }

        let bearing = (-dz_dx).atan2(-dz_dy).to_degrees();
        if bearing < 0.0 { bearing + 360.0 } else { bearing }
    }
}
