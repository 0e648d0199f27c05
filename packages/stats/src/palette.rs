//! Threshold color scales for rendering data layers.
//!
//! Each [`DataKind`] owns an ordered table of `(threshold, color)` stops
//! over the unit interval. Lookup normalizes the raw value against the
//! layer's [`Bounds`] and picks the first stop whose threshold is not
//! exceeded, with the last color serving as the open-ended top bucket.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::normalize::Bounds;

const PRECIPITATION_STOPS: &[(f64, &str)] = &[
    (0.2, "#deebf7"),
    (0.4, "#9ecae1"),
    (0.6, "#4292c6"),
    (0.8, "#2171b5"),
    (1.0, "#084594"),
];

const TEMPERATURE_STOPS: &[(f64, &str)] = &[
    (0.2, "#fee5d9"),
    (0.4, "#fcae91"),
    (0.6, "#fb6a4a"),
    (0.8, "#de2d26"),
    (1.0, "#a50f15"),
];

const VEGETATION_STOPS: &[(f64, &str)] = &[
    (0.2, "#edf8e9"),
    (0.4, "#bae4b3"),
    (0.6, "#74c476"),
    (0.8, "#31a354"),
    (1.0, "#006d2c"),
];

const ELEVATION_STOPS: &[(f64, &str)] = &[
    (0.2, "#31a354"),
    (0.4, "#addd8e"),
    (0.6, "#d8c99a"),
    (0.8, "#b08968"),
    (1.0, "#f7f7f7"),
];

/// Aligned with the shared risk level breakpoints, plus the open-ended
/// extreme bucket.
const RISK_STOPS: &[(f64, &str)] = &[
    (0.25, "#2dc937"),
    (0.5, "#e7b416"),
    (0.75, "#e06f1f"),
    (1.0, "#cc3232"),
];

/// The data layers the system can render.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DataKind {
    /// Rainfall accumulation layers.
    Precipitation,
    /// Temperature layers.
    Temperature,
    /// Vegetation index (NDVI-style) layers.
    VegetationIndex,
    /// Terrain elevation layers.
    Elevation,
    /// Composite or per-hazard risk score layers.
    Risk,
}

impl DataKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Precipitation,
            Self::Temperature,
            Self::VegetationIndex,
            Self::Elevation,
            Self::Risk,
        ]
    }

    /// The ordered `(threshold, color)` stops for this layer.
    #[must_use]
    pub const fn stops(self) -> &'static [(f64, &'static str)] {
        match self {
            Self::Precipitation => PRECIPITATION_STOPS,
            Self::Temperature => TEMPERATURE_STOPS,
            Self::VegetationIndex => VEGETATION_STOPS,
            Self::Elevation => ELEVATION_STOPS,
            Self::Risk => RISK_STOPS,
        }
    }

    /// Hex color for `value` within `bounds`.
    #[must_use]
    pub fn color_for_value(self, value: f64, bounds: Bounds) -> &'static str {
        let position = bounds.position(value);
        let stops = self.stops();

        for (threshold, color) in stops {
            if position <= *threshold {
                return color;
            }
        }

        // Open-ended top bucket.
        stops[stops.len() - 1].1
    }
}
