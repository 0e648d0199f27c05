//! Min-max normalization to the unit interval.

use serde::{Deserialize, Serialize};

/// An inclusive value range used for normalization and palette lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Observed min and max of `values`, or `None` when empty.
    #[must_use]
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let (min, max) = values
            .iter()
            .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v)));

        Some(Self { min, max })
    }

    /// Position of `value` within the range, clamped to [0, 1].
    ///
    /// A degenerate range (`max == min`) positions everything at the
    /// midpoint 0.5.
    #[must_use]
    pub fn position(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }

        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Min-max normalizes `values` to [0, 1].
///
/// With `None` the bounds are derived from the values themselves. A
/// degenerate range maps every value to 0.5; an empty input yields an
/// empty vec.
#[must_use]
pub fn normalize(values: &[f64], bounds: Option<Bounds>) -> Vec<f64> {
    let Some(bounds) = bounds.or_else(|| Bounds::of(values)) else {
        return Vec::new();
    };

    values.iter().map(|v| bounds.position(*v)).collect()
}
