#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Weather and terrain provider traits plus their HTTP implementations.
//!
//! The engine consumes upstream data exclusively through the
//! [`WeatherProvider`] and [`TerrainProvider`] traits, so fetching is
//! swappable and mockable. The bundled implementations talk to the
//! Open-Meteo archive and elevation APIs through the shared retry helper
//! in [`retry`].

pub mod open_meteo;
pub mod retry;
pub mod terrain;

use std::collections::BTreeMap;

use async_trait::async_trait;
use hazard_map_geo_models::{Coordinate, DateRange};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use open_meteo::{OpenMeteoConfig, OpenMeteoWeather};
pub use terrain::{GradientTerrain, TerrainConfig};

/// Errors that can occur while fetching upstream data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response decoded but did not have the expected shape.
    #[error("Malformed response: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

/// How often a weather field is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cadence {
    /// One value per day.
    Daily,
    /// One value per hour.
    Hourly,
}

/// The weather series the engine knows how to consume.
///
/// Providers return entries only for the fields they support; a missing
/// entry means the provider has no data for that field, not an error.
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
pub enum WeatherField {
    /// Daily precipitation accumulation, millimeters.
    PrecipitationSum,
    /// Daily maximum air temperature at 2 m, Celsius.
    TemperatureMax,
    /// Daily minimum air temperature at 2 m, Celsius.
    TemperatureMin,
    /// Daily mean air temperature at 2 m, Celsius.
    TemperatureMean,
    /// Topsoil volumetric moisture, 0-1 fraction.
    SoilMoisture,
    /// Vegetation index, 0-1 fraction. Not published by Open-Meteo;
    /// richer providers may supply it.
    VegetationIndex,
}

impl WeatherField {
    /// The Open-Meteo series name for this field, or `None` when the
    /// archive API does not publish it.
    #[must_use]
    pub const fn api_name(self) -> Option<&'static str> {
        match self {
            Self::PrecipitationSum => Some("precipitation_sum"),
            Self::TemperatureMax => Some("temperature_2m_max"),
            Self::TemperatureMin => Some("temperature_2m_min"),
            Self::TemperatureMean => Some("temperature_2m_mean"),
            Self::SoilMoisture => Some("soil_moisture_0_to_7cm"),
            Self::VegetationIndex => None,
        }
    }

    /// Which response section this field is read from.
    #[must_use]
    pub const fn cadence(self) -> Cadence {
        match self {
            Self::PrecipitationSum
            | Self::TemperatureMax
            | Self::TemperatureMin
            | Self::TemperatureMean
            | Self::VegetationIndex => Cadence::Daily,
            Self::SoilMoisture => Cadence::Hourly,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PrecipitationSum,
            Self::TemperatureMax,
            Self::TemperatureMin,
            Self::TemperatureMean,
            Self::SoilMoisture,
            Self::VegetationIndex,
        ]
    }
}

/// Historical weather series for one location and date range.
///
/// Dates are implicit in array order (oldest first); a `None` element is
/// a gap the upstream reported as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalWeather {
    /// One entry per returned daily field.
    pub daily: BTreeMap<WeatherField, Vec<Option<f64>>>,
    /// One entry per returned hourly field.
    pub hourly: BTreeMap<WeatherField, Vec<Option<f64>>>,
}

impl HistoricalWeather {
    /// The raw series for `field`, empty when the provider returned none.
    #[must_use]
    pub fn series(&self, field: WeatherField) -> &[Option<f64>] {
        let section = match field.cadence() {
            Cadence::Daily => &self.daily,
            Cadence::Hourly => &self.hourly,
        };

        section.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Present values of `field` in order, gaps dropped.
    #[must_use]
    pub fn present_values(&self, field: WeatherField) -> Vec<f64> {
        self.series(field).iter().filter_map(|v| *v).collect()
    }

    /// The most recent present value of `field`.
    #[must_use]
    pub fn latest(&self, field: WeatherField) -> Option<f64> {
        self.series(field).iter().rev().find_map(|v| *v)
    }

    /// Sum of all present values of `field`, or `None` when the series
    /// has no data at all (distinct from a genuine zero total).
    #[must_use]
    pub fn total(&self, field: WeatherField) -> Option<f64> {
        let values = self.present_values(field);
        if values.is_empty() {
            return None;
        }

        Some(values.iter().sum())
    }
}

/// Elevation and derived gradient for one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainProfile {
    /// Elevation above sea level, meters.
    pub elevation_m: f64,
    /// Steepest incline, degrees from horizontal.
    pub slope_degrees: f64,
    /// Downslope compass bearing, degrees clockwise from north.
    pub aspect_degrees: f64,
}

/// A provider of historical weather series.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Returns a unique identifier for this provider (e.g. `"open_meteo"`).
    fn id(&self) -> &str;

    /// Fetches the requested fields for one location over a date range.
    ///
    /// Fields the provider does not support are simply absent from the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails after retries or the
    /// response cannot be decoded.
    async fn fetch_history(
        &self,
        coordinate: Coordinate,
        range: &DateRange,
        fields: &[WeatherField],
    ) -> Result<HistoricalWeather, SourceError>;
}

/// A provider of elevation and slope data.
#[async_trait]
pub trait TerrainProvider: Send + Sync {
    /// Returns a unique identifier for this provider.
    fn id(&self) -> &str;

    /// Fetches the terrain profile at one location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the fetch fails after retries or the
    /// response cannot be decoded.
    async fn fetch(&self, coordinate: Coordinate) -> Result<TerrainProfile, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_maps_to_a_unique_api_name() {
        let mut seen = std::collections::BTreeSet::new();
        for field in WeatherField::all() {
            if let Some(name) = field.api_name() {
                assert!(seen.insert(name), "duplicate api name {name}");
            }
        }
        assert_eq!(
            WeatherField::VegetationIndex.api_name(),
            None,
            "open-meteo has no vegetation series"
        );
    }

    #[test]
    fn soil_moisture_is_the_only_hourly_field() {
        for field in WeatherField::all() {
            let expected = if *field == WeatherField::SoilMoisture {
                Cadence::Hourly
            } else {
                Cadence::Daily
            };
            assert_eq!(field.cadence(), expected);
        }
    }

    #[test]
    fn series_helpers_tolerate_gaps_and_missing_fields() {
        let mut weather = HistoricalWeather::default();
        weather.daily.insert(
            WeatherField::PrecipitationSum,
            vec![Some(1.0), None, Some(3.5), None],
        );

        assert_eq!(
            weather.present_values(WeatherField::PrecipitationSum),
            vec![1.0, 3.5]
        );
        assert_eq!(weather.latest(WeatherField::PrecipitationSum), Some(3.5));
        assert_eq!(weather.total(WeatherField::PrecipitationSum), Some(4.5));

        assert!(weather.series(WeatherField::TemperatureMax).is_empty());
        assert_eq!(weather.total(WeatherField::TemperatureMax), None);
        assert_eq!(weather.latest(WeatherField::SoilMoisture), None);
    }

    #[test]
    fn all_none_series_totals_to_none() {
        let mut weather = HistoricalWeather::default();
        weather
            .daily
            .insert(WeatherField::TemperatureMean, vec![None, None]);

        assert_eq!(weather.total(WeatherField::TemperatureMean), None);
        assert!(
            weather
                .present_values(WeatherField::TemperatureMean)
                .is_empty()
        );
    }
}
