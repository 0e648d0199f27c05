#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Time-series statistics for the hazard-map engine.
//!
//! Anomaly detection scores a current observation against its own history
//! (z-score, percentile rank, severity bucket). Normalization and the color
//! palettes support rendering interpolated surfaces; both operate on the
//! same [`Bounds`] so a map layer and its legend always agree.

pub mod anomaly;
pub mod normalize;
pub mod palette;

pub use anomaly::{AnomalyConfig, AnomalyDetector, mean, percentile_rank, population_variance};
pub use normalize::{Bounds, normalize};
pub use palette::DataKind;
