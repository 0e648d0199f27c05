//! Great-circle distance, bounding boxes, and grid generation.

use hazard_map_geo_models::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};

/// Constants for geodesic math.
///
/// The defaults (mean Earth radius 6371 km, 111 km per degree of latitude)
/// are the usual spherical approximations and are accurate to well under a
/// percent for the distances this engine works at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeometryConfig {
    /// Mean Earth radius in kilometers.
    pub earth_radius_km: f64,
    /// North-south extent of one degree of latitude, in kilometers.
    pub km_per_degree_lat: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            earth_radius_km: 6371.0,
            km_per_degree_lat: 111.0,
        }
    }
}

/// Spherical-Earth geometry: distances, boxes around a point, lattices
/// over a box.
#[derive(Debug, Clone, Copy, Default)]
pub struct Geodesic {
    config: GeometryConfig,
}

impl Geodesic {
    #[must_use]
    pub const fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    /// Haversine distance between two coordinates, in kilometers.
    #[must_use]
    pub fn distance_km(&self, a: Coordinate, b: Coordinate) -> f64 {
        let lat_a = a.lat.to_radians();
        let lat_b = b.lat.to_radians();
        let lat_term = ((b.lat - a.lat).to_radians() / 2.0).sin().powi(2);
        let lon_term = ((b.lon - a.lon).to_radians() / 2.0).sin().powi(2);

        let h = (lat_a.cos() * lat_b.cos()).mul_add(lon_term, lat_term);
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        self.config.earth_radius_km * c
    }

    /// Axis-aligned box extending `radius_km` from `center` in each
    /// cardinal direction.
    ///
    /// The longitude span widens with latitude since meridians converge
    /// toward the poles. Bounds are truncated at the valid coordinate
    /// range, so a box near a pole or the antimeridian covers less than
    /// the requested radius on the clipped side rather than wrapping.
    /// `radius_km` must be positive.
    #[must_use]
    pub fn bounding_box(&self, center: Coordinate, radius_km: f64) -> BoundingBox {
        let lat_delta = radius_km / self.config.km_per_degree_lat;
        let km_per_degree_lon = self.config.km_per_degree_lat * center.lat.to_radians().cos();
        let lon_delta = if km_per_degree_lon > f64::EPSILON {
            radius_km / km_per_degree_lon
        } else {
            // At the pole itself every meridian passes through the center.
            180.0
        };

        BoundingBox::new(
            (center.lat + lat_delta).min(90.0),
            (center.lat - lat_delta).max(-90.0),
            (center.lon + lon_delta).min(180.0),
            (center.lon - lon_delta).max(-180.0),
        )
    }

    /// Uniform `(grid_size + 1) x (grid_size + 1)` lattice of points over
    /// `bbox`, produced south-to-north, west-to-east.
    ///
    /// Edge points land exactly on the box bounds, so `grid(bbox, 1)`
    /// returns precisely the four corners. A `grid_size` of zero yields an
    /// empty vec.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn grid(&self, bbox: BoundingBox, grid_size: usize) -> Vec<Coordinate> {
        if grid_size == 0 {
            return Vec::new();
        }

        let steps = grid_size + 1;
        let mut points = Vec::with_capacity(steps * steps);

        #[allow(clippy::cast_precision_loss)]
        let divisions = grid_size as f64;

        for i in 0..steps {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / divisions;
            let lat = bbox.south.mul_add(1.0 - t, bbox.north * t);
            for j in 0..steps {
                #[allow(clippy::cast_precision_loss)]
                let u = j as f64 / divisions;
                let lon = bbox.west.mul_add(1.0 - u, bbox.east * u);
                points.push(Coordinate::new(lat, lon));
            }
        }

        points
    }
}
