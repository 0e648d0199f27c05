#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic primitive types shared across the hazard-map system.
//!
//! These types carry no behavior beyond construction and validation; all
//! geometry (distances, grids, interpolation) lives in `hazard_map_spatial`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from constructing or validating geographic primitives.
#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    CoordinateOutOfRange {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
    },

    /// Bounding box edges in the wrong order.
    #[error("degenerate bounding box: north={north}, south={south}, east={east}, west={west}")]
    DegenerateBoundingBox {
        /// Northern latitude boundary.
        north: f64,
        /// Southern latitude boundary.
        south: f64,
        /// Eastern longitude boundary.
        east: f64,
        /// Western longitude boundary.
        west: f64,
    },

    /// Date range with `end` before `start`.
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },
}

/// A geographic point in WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in decimal degrees, [-90, 90].
    pub lat: f64,
    /// Longitude in decimal degrees, [-180, 180].
    pub lon: f64,
}

impl Coordinate {
    /// Creates a coordinate without validating it. Use [`Self::validated`]
    /// at system boundaries.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a coordinate, rejecting out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::CoordinateOutOfRange`] if latitude is outside
    /// [-90, 90] or longitude is outside [-180, 180]. NaN fails both checks.
    pub fn validated(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Ok(Self { lat, lon })
        } else {
            Err(GeoError::CoordinateOutOfRange { lat, lon })
        }
    }

    /// Returns `true` if this coordinate satisfies the range invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A geographic bounding box in WGS84 coordinates.
///
/// Invariant: `north > south` and `east > west`. Boxes never wrap the
/// anti-meridian; a box spanning it must be split by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Northern latitude boundary.
    pub north: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Western longitude boundary.
    pub west: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given edges.
    #[must_use]
    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Creates a bounding box, rejecting degenerate edge ordering.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::DegenerateBoundingBox`] unless `north > south`
    /// and `east > west`.
    pub fn validated(north: f64, south: f64, east: f64, west: f64) -> Result<Self, GeoError> {
        if north > south && east > west {
            Ok(Self {
                north,
                south,
                east,
                west,
            })
        } else {
            Err(GeoError::DegenerateBoundingBox {
                north,
                south,
                east,
                west,
            })
        }
    }

    /// Returns the box center.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    /// Returns `true` if the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First date in the range.
    pub start: NaiveDate,
    /// Last date in the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a date range, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidDateRange`] if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GeoError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(GeoError::InvalidDateRange { start, end })
        }
    }

    /// Number of days covered, inclusive of both endpoints.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_coordinates() {
        assert!(Coordinate::validated(-1.9403, 29.8739).is_ok());
        assert!(Coordinate::validated(90.0, 180.0).is_ok());
        assert!(Coordinate::validated(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Coordinate::validated(90.1, 0.0).is_err());
        assert!(Coordinate::validated(0.0, -180.5).is_err());
        assert!(Coordinate::validated(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rejects_degenerate_bounding_box() {
        assert!(BoundingBox::validated(1.0, 2.0, 3.0, 2.0).is_err());
        assert!(BoundingBox::validated(2.0, 1.0, 2.0, 2.0).is_err());
        assert!(BoundingBox::validated(2.0, 1.0, 3.0, 2.0).is_ok());
    }

    #[test]
    fn bounding_box_contains_edges() {
        let bbox = BoundingBox::new(2.0, 1.0, 31.0, 30.0);
        assert!(bbox.contains(&Coordinate::new(1.0, 30.0)));
        assert!(bbox.contains(&Coordinate::new(2.0, 31.0)));
        assert!(!bbox.contains(&Coordinate::new(2.1, 30.5)));
    }

    #[test]
    fn bounding_box_center_is_midpoint() {
        let bbox = BoundingBox::new(2.0, 1.0, 31.0, 30.0);
        let center = bbox.center();
        assert!((center.lat - 1.5).abs() < f64::EPSILON);
        assert!((center.lon - 30.5).abs() < f64::EPSILON);
    }

    #[test]
    fn date_range_counts_inclusive_days() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let range = DateRange::new(start, end).unwrap();
        assert_eq!(range.num_days(), 31);
    }

    #[test]
    fn date_range_rejects_reversed_endpoints() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRange::new(start, end).is_err());
    }
}
