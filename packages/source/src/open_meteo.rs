//! Open-Meteo historical weather archive client.
//!
//! Fetches daily and hourly series from the archive API in a single
//! request per assessment. Response decoding is null-tolerant: gaps in
//! the upstream series come back as `None` rather than failing the
//! whole fetch.

use std::time::Duration;

use async_trait::async_trait;
use hazard_map_geo_models::{Coordinate, DateRange};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Cadence, HistoricalWeather, SourceError, WeatherField, WeatherProvider, retry};

const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for the Open-Meteo archive client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenMeteoConfig {
    /// Base URL of the archive API.
    pub archive_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// [`WeatherProvider`] backed by the Open-Meteo archive API.
pub struct OpenMeteoWeather {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoWeather {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: OpenMeteoConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    fn id(&self) -> &str {
        "open_meteo"
    }

    async fn fetch_history(
        &self,
        coordinate: Coordinate,
        range: &DateRange,
        fields: &[WeatherField],
    ) -> Result<HistoricalWeather, SourceError> {
        let daily = join_api_names(fields, Cadence::Daily);
        let hourly = join_api_names(fields, Cadence::Hourly);

        let mut params = vec![
            ("latitude", coordinate.lat.to_string()),
            ("longitude", coordinate.lon.to_string()),
            ("start_date", range.start.format("%Y-%m-%d").to_string()),
            ("end_date", range.end.format("%Y-%m-%d").to_string()),
            ("timezone", "UTC".to_string()),
        ];
        if !daily.is_empty() {
            params.push(("daily", daily));
        }
        if !hourly.is_empty() {
            params.push(("hourly", hourly));
        }

        log::info!(
            "Fetching weather history: lat={}, lon={}, {} to {}",
            coordinate.lat,
            coordinate.lon,
            range.start,
            range.end,
        );
        let body =
            retry::send_json(|| self.client.get(&self.config.archive_url).query(&params)).await?;

        decode_history(&body, fields)
    }
}

fn join_api_names(fields: &[WeatherField], cadence: Cadence) -> String {
    fields
        .iter()
        .filter(|field| field.cadence() == cadence)
        .filter_map(|field| field.api_name())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes an archive API response body into [`HistoricalWeather`].
///
/// Only the requested `fields` are read. A field series missing from the
/// body is simply absent from the result; null elements inside a series
/// become `None`.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] if the body is not a JSON object
/// or the upstream reported an error.
fn decode_history(body: &Value, fields: &[WeatherField]) -> Result<HistoricalWeather, SourceError> {
    if !body.is_object() {
        return Err(SourceError::Malformed {
            message: "expected a JSON object".to_string(),
        });
    }
    if body["error"].as_bool() == Some(true) {
        let reason = body["reason"].as_str().unwrap_or("unknown");
        return Err(SourceError::Malformed {
            message: format!("upstream error: {reason}"),
        });
    }

    let mut weather = HistoricalWeather::default();

    for field in fields {
        let Some(api_name) = field.api_name() else {
            continue;
        };

        let (section, target) = match field.cadence() {
            Cadence::Daily => ("daily", &mut weather.daily),
            Cadence::Hourly => ("hourly", &mut weather.hourly),
        };
        let Some(series) = body[section][api_name].as_array() else {
            continue;
        };

        target.insert(*field, series.iter().map(Value::as_f64).collect());
    }

    Ok(weather)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn joins_api_names_by_cadence() {
        let fields = [
            WeatherField::PrecipitationSum,
            WeatherField::SoilMoisture,
            WeatherField::TemperatureMean,
            WeatherField::VegetationIndex,
        ];

        assert_eq!(
            join_api_names(&fields, Cadence::Daily),
            "precipitation_sum,temperature_2m_mean"
        );
        assert_eq!(
            join_api_names(&fields, Cadence::Hourly),
            "soil_moisture_0_to_7cm"
        );
    }

    #[test]
    fn decodes_daily_and_hourly_sections() {
        let body = json!({
            "daily": {
                "time": ["2024-01-01", "2024-01-02", "2024-01-03"],
                "precipitation_sum": [0.0, 12.4, null],
                "temperature_2m_mean": [21.0, 22.5, 20.1],
            },
            "hourly": {
                "soil_moisture_0_to_7cm": [0.31, null, 0.33],
            },
        });

        let fields = [
            WeatherField::PrecipitationSum,
            WeatherField::TemperatureMean,
            WeatherField::SoilMoisture,
        ];
        let weather = decode_history(&body, &fields).unwrap();

        assert_eq!(
            weather.series(WeatherField::PrecipitationSum),
            &[Some(0.0), Some(12.4), None]
        );
        assert_eq!(
            weather.series(WeatherField::TemperatureMean),
            &[Some(21.0), Some(22.5), Some(20.1)]
        );
        assert_eq!(
            weather.series(WeatherField::SoilMoisture),
            &[Some(0.31), None, Some(0.33)]
        );
    }

    #[test]
    fn skips_series_the_body_does_not_carry() {
        let body = json!({
            "daily": {
                "precipitation_sum": [1.0],
            },
        });

        let fields = [
            WeatherField::PrecipitationSum,
            WeatherField::TemperatureMax,
            WeatherField::VegetationIndex,
        ];
        let weather = decode_history(&body, &fields).unwrap();

        assert_eq!(weather.daily.len(), 1);
        assert!(weather.hourly.is_empty());
        assert!(weather.series(WeatherField::TemperatureMax).is_empty());
    }

    #[test]
    fn only_requested_fields_are_decoded() {
        let body = json!({
            "daily": {
                "precipitation_sum": [1.0],
                "temperature_2m_mean": [20.0],
            },
        });

        let weather = decode_history(&body, &[WeatherField::PrecipitationSum]).unwrap();

        assert_eq!(weather.daily.len(), 1);
        assert!(weather.daily.contains_key(&WeatherField::PrecipitationSum));
    }

    #[test]
    fn rejects_non_object_body() {
        let body = json!([1, 2, 3]);

        let result = decode_history(&body, &[WeatherField::PrecipitationSum]);

        assert!(matches!(result, Err(SourceError::Malformed { .. })));
    }

    #[test]
    fn surfaces_upstream_error_flag() {
        let body = json!({
            "error": true,
            "reason": "Parameter 'start_date' is out of allowed range",
        });

        let result = decode_history(&body, &[WeatherField::PrecipitationSum]);

        match result {
            Err(SourceError::Malformed { message }) => {
                assert!(message.contains("out of allowed range"));
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
