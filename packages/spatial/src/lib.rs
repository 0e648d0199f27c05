#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial math for the hazard-map engine.
//!
//! Three concerns live here:
//!
//! - [`Geodesic`]: great-circle distance, bounding-box construction from a
//!   center and radius, and uniform grid generation over a box.
//! - [`Interpolator`]: inverse-distance-weighted estimation of a value at an
//!   arbitrary point from sparse samples, and full heatmaps over a grid.
//! - [`gradient`]: slope/aspect derivation from finite-difference elevation
//!   probes, used to turn raw elevation fetches into terrain profiles.
//!
//! Everything here is synchronous and pure. Constants (Earth radius, degree
//! length, IDW power) come in through config structs rather than being
//! buried in the formulas.

pub mod geodesic;
pub mod gradient;
pub mod idw;

pub use geodesic::{Geodesic, GeometryConfig};
pub use idw::{IdwConfig, Interpolator};

use hazard_map_geo_models::Coordinate;
use serde::{Deserialize, Serialize};

/// A sampled value anchored at a geographic point.
///
/// Used both as interpolation input (known observations) and heatmap output
/// (one estimated value per grid point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialSample {
    /// Where the value was observed or estimated.
    pub point: Coordinate,
    /// The observed or estimated value.
    pub value: f64,
}

impl SpatialSample {
    /// Creates a sample at the given point.
    #[must_use]
    pub const fn new(point: Coordinate, value: f64) -> Self {
        Self { point, value }
    }
}
