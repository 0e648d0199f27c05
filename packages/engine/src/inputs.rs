//! Derivation of model inputs from raw provider data.
//!
//! Everything here is pure: fetched weather series and an optional
//! terrain profile go in, the three hazard models' inputs and the
//! composite index's anomaly signals come out. Missing optional series
//! stay `None` and cost confidence downstream; only a precipitation
//! window without any data is fatal.

use hazard_map_scoring::{BASELINE_WINDOW_DAYS, DroughtInputs, FloodInputs, LandslideInputs};
use hazard_map_source::{Cadence, HistoricalWeather, TerrainProfile, WeatherField};
use hazard_map_stats::{AnomalyDetector, mean};

use crate::EngineError;

/// Present values of one series, split into the recent assessment window
/// and the whole baseline span.
#[derive(Debug, Clone, Default)]
struct SeriesWindow {
    recent: Vec<f64>,
    all: Vec<f64>,
}

impl SeriesWindow {
    fn of(weather: &HistoricalWeather, field: WeatherField, history_days: u32) -> Self {
        let series = weather.series(field);
        let samples_per_day = match field.cadence() {
            Cadence::Daily => 1,
            Cadence::Hourly => 24,
        };
        let recent_len = history_days as usize * samples_per_day;
        let start = series.len().saturating_sub(recent_len);

        Self {
            recent: series[start..].iter().filter_map(|v| *v).collect(),
            all: series.iter().filter_map(|v| *v).collect(),
        }
    }

    fn recent_mean(&self) -> Option<f64> {
        if self.recent.is_empty() {
            None
        } else {
            Some(mean(&self.recent))
        }
    }

    fn recent_total(&self) -> f64 {
        self.recent.iter().sum()
    }
}

/// Everything the hazard models and the composite index consume for one
/// location, derived from one weather fetch and one terrain fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputs {
    pub flood: FloodInputs,
    pub drought: DroughtInputs,
    pub landslide: LandslideInputs,
    /// Recent-vs-baseline z-score of daily precipitation; `0.0` when the
    /// window carries no data.
    pub precipitation_anomaly: f64,
    /// Recent-vs-baseline z-score of daily mean temperature.
    pub temperature_anomaly: f64,
    /// Recent-vs-baseline z-score of the vegetation index.
    pub vegetation_anomaly: f64,
}

/// Derives every model input for one assessment.
///
/// The recent window is the trailing `history_days` of each series
/// (scaled to 24 samples per day for hourly cadence); the baseline is
/// the whole fetched span. The monthly rainfall baseline is the
/// all-span daily mean scaled by [`BASELINE_WINDOW_DAYS`], the same
/// constant the scoring crate scales it back down with.
///
/// # Errors
///
/// Returns [`EngineError::DataUnavailable`] when the recent window has
/// no precipitation data at all; rainfall is the one input every model
/// requires.
pub fn derive(
    weather: &HistoricalWeather,
    terrain: Option<&TerrainProfile>,
    detector: &AnomalyDetector,
    history_days: u32,
) -> Result<ModelInputs, EngineError> {
    let precipitation = SeriesWindow::of(weather, WeatherField::PrecipitationSum, history_days);
    if precipitation.recent.is_empty() {
        return Err(EngineError::DataUnavailable {
            message: "no precipitation data in the assessment window".to_string(),
        });
    }

    let temperature = SeriesWindow::of(weather, WeatherField::TemperatureMean, history_days);
    let soil = SeriesWindow::of(weather, WeatherField::SoilMoisture, history_days);
    let vegetation = SeriesWindow::of(weather, WeatherField::VegetationIndex, history_days);

    let recent_rainfall_mm = precipitation.recent_total();
    let baseline_monthly_rainfall_mm = mean(&precipitation.all) * BASELINE_WINDOW_DAYS;

    let soil_moisture = soil.recent_mean();
    let vegetation_index = vegetation.recent_mean();

    let precipitation_z = anomaly_z(detector, &precipitation);
    let temperature_z = anomaly_z(detector, &temperature);
    let vegetation_z = anomaly_z(detector, &vegetation);

    let (elevation_m, slope_degrees) = terrain.map_or((None, None), |profile| {
        (Some(profile.elevation_m), Some(profile.slope_degrees))
    });

    Ok(ModelInputs {
        flood: FloodInputs {
            recent_rainfall_mm,
            baseline_monthly_rainfall_mm,
            window_days: history_days,
            soil_moisture,
            elevation_m,
            slope_degrees,
            vegetation_index,
        },
        drought: DroughtInputs {
            recent_rainfall_mm,
            baseline_monthly_rainfall_mm,
            window_days: history_days,
            soil_moisture,
            temperature_anomaly: temperature_z,
            vegetation_index,
        },
        landslide: LandslideInputs {
            recent_rainfall_mm,
            baseline_monthly_rainfall_mm,
            window_days: history_days,
            slope_degrees,
            soil_moisture,
            vegetation_index,
        },
        precipitation_anomaly: precipitation_z.unwrap_or(0.0),
        temperature_anomaly: temperature_z.unwrap_or(0.0),
        vegetation_anomaly: vegetation_z.unwrap_or(0.0),
    })
}

/// Z-score of the recent-window mean against the whole span, or `None`
/// when the window has no data for this series.
fn anomaly_z(detector: &AnomalyDetector, window: &SeriesWindow) -> Option<f64> {
    let current = window.recent_mean()?;

    Some(detector.calculate(current, &window.all).anomaly)
}

#[cfg(test)]
mod tests {
    use hazard_map_stats::AnomalyConfig;

    use super::*;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(AnomalyConfig::default())
    }

    fn weather_with_precipitation(values: Vec<Option<f64>>) -> HistoricalWeather {
        let mut weather = HistoricalWeather::default();
        weather.daily.insert(WeatherField::PrecipitationSum, values);
        weather
    }

    #[test]
    fn empty_precipitation_window_is_unavailable() {
        let no_series = HistoricalWeather::default();
        assert!(matches!(
            derive(&no_series, None, &detector(), 30),
            Err(EngineError::DataUnavailable { .. })
        ));

        // Data exists, but none of it falls inside the recent window.
        let mut stale = vec![Some(5.0); 20];
        stale.extend(vec![None; 10]);
        assert!(matches!(
            derive(&weather_with_precipitation(stale), None, &detector(), 10),
            Err(EngineError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn builds_the_rainfall_pair_from_window_and_span() {
        let mut series = vec![Some(6.0); 30];
        series.extend(vec![Some(1.0); 10]);
        let weather = weather_with_precipitation(series);

        let inputs = derive(&weather, None, &detector(), 10).unwrap();

        assert!((inputs.flood.recent_rainfall_mm - 10.0).abs() < 1e-9);
        // Span mean 4.75 mm/day scaled to the 30 day reference month.
        assert!((inputs.flood.baseline_monthly_rainfall_mm - 142.5).abs() < 1e-9);
        assert_eq!(inputs.flood.window_days, 10);
        assert_eq!(inputs.drought.window_days, 10);
        assert_eq!(inputs.landslide.window_days, 10);
        // The dry recent window sits well below the span distribution.
        assert!((inputs.precipitation_anomaly + 1.732_050_8).abs() < 1e-6);
    }

    #[test]
    fn temperature_anomaly_matches_the_detector() {
        let mut weather = weather_with_precipitation(vec![Some(2.0); 5]);
        weather.daily.insert(
            WeatherField::TemperatureMean,
            vec![Some(10.0), Some(10.0), Some(14.0), Some(14.0), Some(16.0)],
        );

        let inputs = derive(&weather, None, &detector(), 1).unwrap();

        // Current 16 against mean 12.8 and population std dev 2.4.
        assert!((inputs.temperature_anomaly - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(inputs.drought.temperature_anomaly, Some(inputs.temperature_anomaly));
    }

    #[test]
    fn hourly_series_window_scales_by_twenty_four() {
        let mut weather = weather_with_precipitation(vec![Some(2.0); 2]);
        let mut soil = vec![Some(0.2); 24];
        soil.extend(vec![Some(0.4); 24]);
        weather.hourly.insert(WeatherField::SoilMoisture, soil);

        let inputs = derive(&weather, None, &detector(), 1).unwrap();

        let moisture = inputs.flood.soil_moisture.unwrap();
        assert!((moisture - 0.4).abs() < 1e-12);
    }

    #[test]
    fn missing_optional_series_stay_none() {
        let weather = weather_with_precipitation(vec![Some(3.0); 30]);

        let inputs = derive(&weather, None, &detector(), 30).unwrap();

        assert_eq!(inputs.flood.soil_moisture, None);
        assert_eq!(inputs.flood.vegetation_index, None);
        assert_eq!(inputs.drought.temperature_anomaly, None);
        assert!(inputs.temperature_anomaly.abs() < f64::EPSILON);
        assert!(inputs.vegetation_anomaly.abs() < f64::EPSILON);
    }

    #[test]
    fn terrain_profile_feeds_flood_and_landslide() {
        let weather = weather_with_precipitation(vec![Some(3.0); 30]);
        let profile = TerrainProfile {
            elevation_m: 1567.0,
            slope_degrees: 12.0,
            aspect_degrees: 90.0,
        };

        let with_terrain = derive(&weather, Some(&profile), &detector(), 30).unwrap();
        assert_eq!(with_terrain.flood.elevation_m, Some(1567.0));
        assert_eq!(with_terrain.flood.slope_degrees, Some(12.0));
        assert_eq!(with_terrain.landslide.slope_degrees, Some(12.0));

        let without = derive(&weather, None, &detector(), 30).unwrap();
        assert_eq!(without.flood.elevation_m, None);
        assert_eq!(without.landslide.slope_degrees, None);
    }
}
