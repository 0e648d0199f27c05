//! Terrain profiling via the Open-Meteo elevation API.
//!
//! The elevation API only reports height, so slope and aspect are
//! derived numerically: one batched request samples elevation at the
//! target point plus four probes offset north, south, east, and west,
//! and the central-difference gradient across the probes yields the
//! profile.

use std::time::Duration;

use async_trait::async_trait;
use hazard_map_geo_models::Coordinate;
use hazard_map_spatial::gradient::ElevationProbe;
use hazard_map_spatial::{Geodesic, GeometryConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{SourceError, TerrainProfile, TerrainProvider, retry};

const DEFAULT_ELEVATION_URL: &str = "https://api.open-meteo.com/v1/elevation";
const DEFAULT_PROBE_OFFSET_DEGREES: f64 = 0.01;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Samples per profile: the center plus four compass-offset probes.
const PROBE_COUNT: usize = 5;

/// Configuration for the gradient terrain client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainConfig {
    /// Base URL of the elevation API.
    pub elevation_url: String,
    /// Offset of the gradient probes from the center, in degrees.
    pub probe_offset_degrees: f64,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            elevation_url: DEFAULT_ELEVATION_URL.to_string(),
            probe_offset_degrees: DEFAULT_PROBE_OFFSET_DEGREES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// [`TerrainProvider`] backed by the Open-Meteo elevation API.
pub struct GradientTerrain {
    client: reqwest::Client,
    config: TerrainConfig,
    geodesic: Geodesic,
}

impl GradientTerrain {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: TerrainConfig, geometry: GeometryConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            geodesic: Geodesic::new(geometry),
        })
    }

    /// The five sample points for `center`: itself, then north, south,
    /// east, and west probes.
    fn probe_points(&self, center: Coordinate) -> [Coordinate; PROBE_COUNT] {
        let offset = self.config.probe_offset_degrees;

        [
            center,
            Coordinate::new(offset_lat(center.lat, offset), center.lon),
            Coordinate::new(offset_lat(center.lat, -offset), center.lon),
            Coordinate::new(center.lat, offset_lon(center.lon, offset)),
            Coordinate::new(center.lat, offset_lon(center.lon, -offset)),
        ]
    }

    fn profile(
        &self,
        probes: &[Coordinate; PROBE_COUNT],
        elevations: [f64; PROBE_COUNT],
    ) -> TerrainProfile {
        let probe = ElevationProbe {
            north_m: elevations[1],
            south_m: elevations[2],
            east_m: elevations[3],
            west_m: elevations[4],
            ns_span_m: self.geodesic.distance_km(probes[1], probes[2]) * 1000.0,
            ew_span_m: self.geodesic.distance_km(probes[3], probes[4]) * 1000.0,
        };

        TerrainProfile {
            elevation_m: elevations[0],
            slope_degrees: probe.slope_degrees(),
            aspect_degrees: probe.aspect_degrees(),
        }
    }
}

#[async_trait]
impl TerrainProvider for GradientTerrain {
    fn id(&self) -> &str {
        "open_meteo_elevation"
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<TerrainProfile, SourceError> {
        let probes = self.probe_points(coordinate);
        let latitudes = join_axis(&probes, |p| p.lat);
        let longitudes = join_axis(&probes, |p| p.lon);

        log::info!(
            "Fetching terrain profile: lat={}, lon={}",
            coordinate.lat,
            coordinate.lon,
        );
        let body = retry::send_json(|| {
            self.client
                .get(&self.config.elevation_url)
                .query(&[("latitude", &latitudes), ("longitude", &longitudes)])
        })
        .await?;

        let elevations = decode_elevations(&body)?;

        Ok(self.profile(&probes, elevations))
    }
}

fn offset_lat(lat: f64, delta: f64) -> f64 {
    (lat + delta).clamp(-90.0, 90.0)
}

fn offset_lon(lon: f64, delta: f64) -> f64 {
    let shifted = lon + delta;
    if shifted > 180.0 {
        shifted - 360.0
    } else if shifted < -180.0 {
        shifted + 360.0
    } else {
        shifted
    }
}

fn join_axis<F>(probes: &[Coordinate], axis: F) -> String
where
    F: Fn(&Coordinate) -> f64,
{
    probes
        .iter()
        .map(|p| axis(p).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes an elevation API response into one height per probe point.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] if the upstream reported an error,
/// the elevation array is missing or non-numeric, or it does not have
/// exactly [`PROBE_COUNT`] entries.
fn decode_elevations(body: &Value) -> Result<[f64; PROBE_COUNT], SourceError> {
    if body["error"].as_bool() == Some(true) {
        let reason = body["reason"].as_str().unwrap_or("unknown");
        return Err(SourceError::Malformed {
            message: format!("upstream error: {reason}"),
        });
    }

    let values = body["elevation"]
        .as_array()
        .and_then(|series| series.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| SourceError::Malformed {
            message: "missing or non-numeric elevation array".to_string(),
        })?;

    let count = values.len();
    values.try_into().map_err(|_| SourceError::Malformed {
        message: format!("expected {PROBE_COUNT} elevations, got {count}"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn terrain() -> GradientTerrain {
        GradientTerrain::new(TerrainConfig::default(), GeometryConfig::default()).unwrap()
    }

    #[test]
    fn probe_points_straddle_the_center() {
        let center = Coordinate::new(-1.94, 30.06);
        let probes = terrain().probe_points(center);

        assert_eq!(probes[0], center);
        assert!(probes[1].lat > center.lat && probes[2].lat < center.lat);
        assert!(
            (probes[1].lon - center.lon).abs() < f64::EPSILON
                && (probes[2].lon - center.lon).abs() < f64::EPSILON
        );
        assert!(probes[3].lon > center.lon && probes[4].lon < center.lon);
        assert!(
            (probes[3].lat - center.lat).abs() < f64::EPSILON
                && (probes[4].lat - center.lat).abs() < f64::EPSILON
        );
    }

    #[test]
    fn probe_latitude_clamps_at_the_pole() {
        let probes = terrain().probe_points(Coordinate::new(89.995, 0.0));

        assert!((probes[1].lat - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_longitude_wraps_at_the_antimeridian() {
        let probes = terrain().probe_points(Coordinate::new(0.0, 179.995));

        assert!((probes[3].lon - (-179.995)).abs() < 1e-9);
    }

    #[test]
    fn decodes_one_elevation_per_probe() {
        let body = json!({ "elevation": [1500.0, 1520.0, 1480.0, 1510.0, 1490.0] });

        let elevations = decode_elevations(&body).unwrap();

        assert_eq!(elevations, [1500.0, 1520.0, 1480.0, 1510.0, 1490.0]);
    }

    #[test]
    fn rejects_short_elevation_array() {
        let body = json!({ "elevation": [1500.0, 1520.0] });

        let result = decode_elevations(&body);

        assert!(matches!(result, Err(SourceError::Malformed { .. })));
    }

    #[test]
    fn rejects_missing_or_non_numeric_elevations() {
        assert!(decode_elevations(&json!({})).is_err());
        assert!(decode_elevations(&json!({ "elevation": [1.0, null, 3.0, 4.0, 5.0] })).is_err());
    }

    #[test]
    fn surfaces_upstream_error_flag() {
        let body = json!({ "error": true, "reason": "invalid coordinates" });

        match decode_elevations(&body) {
            Err(SourceError::Malformed { message }) => {
                assert!(message.contains("invalid coordinates"));
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn flat_elevations_profile_to_zero_slope() {
        let terrain = terrain();
        let probes = terrain.probe_points(Coordinate::new(-1.94, 30.06));

        let profile = terrain.profile(&probes, [1500.0; PROBE_COUNT]);

        assert!((profile.elevation_m - 1500.0).abs() < f64::EPSILON);
        assert!(profile.slope_degrees.abs() < f64::EPSILON);
        assert!(profile.aspect_degrees.abs() < f64::EPSILON);
    }

    #[test]
    fn north_rising_terrain_slopes_toward_the_south() {
        let terrain = terrain();
        let probes = terrain.probe_points(Coordinate::new(0.0, 30.0));

        // 100 m of rise from the south probe to the north probe.
        let profile = terrain.profile(&probes, [1000.0, 1050.0, 950.0, 1000.0, 1000.0]);

        assert!(profile.slope_degrees > 1.0);
        assert!((profile.aspect_degrees - 180.0).abs() < 1e-6);
    }
}
