#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk models for the hazard-map engine.
//!
//! Each hazard model turns physically meaningful inputs (rainfall
//! accumulations, slope, soil saturation, elevation) into a bounded
//! [`HazardAssessment`](hazard_map_hazard_models::HazardAssessment):
//! a weighted sum of normalized sub-factors clamped to [0, 1], classified
//! through the shared risk level breakpoints, and explained by a
//! deterministic factor list. Models are pure and perform no I/O; all
//! weights and thresholds live in per-model config structs so they are
//! inspectable and overridable rather than buried in the formulas.
//!
//! The flood and drought models read the same rainfall series with
//! inverse-signed logic: a rainfall surplus can only raise flood risk and a
//! deficit can only raise drought risk, never both from the same delta.

pub mod composite;
pub mod drought;
pub mod flood;
pub mod landslide;

pub use composite::{CompositeConfig, CompositeIndex};
pub use drought::{DroughtConfig, DroughtInputs, DroughtModel};
pub use flood::{FloodConfig, FloodInputs, FloodModel};
pub use landslide::{LandslideConfig, LandslideInputs, LandslideModel};

/// Days in the reference month every baseline is expressed against.
///
/// Callers deriving `baseline_monthly_*` values from daily series must
/// scale by the same constant.
pub const BASELINE_WINDOW_DAYS: f64 = 30.0;

/// Scales a monthly rainfall baseline down (or up) to an arbitrary
/// assessment window.
#[must_use]
pub fn expected_rainfall_mm(baseline_monthly_mm: f64, window_days: u32) -> f64 {
    baseline_monthly_mm * f64::from(window_days) / BASELINE_WINDOW_DAYS
}

/// Fractional rainfall surplus over the window-scaled baseline, floored at
/// zero.
///
/// `0.0` means at or below baseline; `1.0` means double the baseline. A
/// non-positive baseline yields zero since there is nothing to compare
/// against.
#[must_use]
pub fn rainfall_excess_fraction(recent_mm: f64, baseline_monthly_mm: f64, window_days: u32) -> f64 {
    let expected = expected_rainfall_mm(baseline_monthly_mm, window_days);
    if expected <= 0.0 {
        return 0.0;
    }

    (recent_mm / expected - 1.0).max(0.0)
}

/// Fractional rainfall shortfall under the window-scaled baseline, in
/// [0, 1].
///
/// `0.0` means at or above baseline; `1.0` means no rain fell at all. A
/// non-positive baseline yields zero. Inverse-signed with respect to
/// [`rainfall_excess_fraction`]: the same rainfall delta can never make
/// both positive.
#[must_use]
pub fn rainfall_deficit_fraction(recent_mm: f64, baseline_monthly_mm: f64, window_days: u32) -> f64 {
    let expected = expected_rainfall_mm(baseline_monthly_mm, window_days);
    if expected <= 0.0 {
        return 0.0;
    }

    ((expected - recent_mm) / expected).clamp(0.0, 1.0)
}

/// Fraction of optional inputs actually supplied, folded together with the
/// always-present required inputs.
pub(crate) fn input_confidence(required: usize, optionals: &[bool]) -> f64 {
    let supplied = optionals.iter().filter(|present| **present).count();
    let total = required + optionals.len();

    #[allow(clippy::cast_precision_loss)]
    let confidence = (required + supplied) as f64 / total as f64;
    confidence
}
