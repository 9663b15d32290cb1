use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::models::delivery::{Coordinates, DistanceEstimate};
use crate::routing::{RoutingError, RoutingProvider};

/// Client for the OpenRouteService geocoding and matrix endpoints.
///
/// Base URL, API key and timeout are injected at construction; nothing is
/// read from ambient globals, so tests can point this at a local mock
/// server.
pub struct OpenRouteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouteClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Deserialize)]
struct GeocodeFeature {
    geometry: GeocodeGeometry,
}

#[derive(Deserialize)]
struct GeocodeGeometry {
    /// [longitude, latitude]
    coordinates: Vec<f64>,
}

#[derive(Serialize)]
struct MatrixRequest {
    locations: Vec<[f64; 2]>,
    metrics: [&'static str; 2],
}

#[derive(Deserialize)]
struct MatrixResponse {
    /// Meters; cells are null for unreachable pairs.
    #[serde(default)]
    distances: Vec<Vec<Option<f64>>>,
    /// Seconds; same shape as `distances`.
    #[serde(default)]
    durations: Vec<Vec<Option<f64>>>,
}

impl MatrixResponse {
    /// The origin-to-destination cell of the 2x2 matrix.
    fn cell(matrix: &[Vec<Option<f64>>]) -> Option<f64> {
        matrix.first().and_then(|row| row.get(1)).copied().flatten()
    }
}

fn estimate_from_matrix(distance_meters: f64, duration_seconds: f64) -> DistanceEstimate {
    DistanceEstimate {
        distance_km: distance_meters / 1000.0,
        eta_minutes: (duration_seconds / 60.0).ceil() as u32,
    }
}

#[async_trait]
impl RoutingProvider for OpenRouteClient {
    async fn geocode(&self, address: &str) -> Result<Coordinates, RoutingError> {
        debug!(address, "geocoding address");

        let url = format!("{}/geocode/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("text", address),
                ("size", "1"),
            ])
            .send()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?
            .json::<GeocodeResponse>()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?;

        let feature = response
            .features
            .first()
            .ok_or_else(|| RoutingError::NoMatch(address.to_string()))?;

        match feature.geometry.coordinates.as_slice() {
            [longitude, latitude, ..] => Ok(Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            }),
            _ => Err(RoutingError::Unavailable(
                "geocoding response missing coordinates".to_string(),
            )),
        }
    }

    async fn distance_and_duration(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DistanceEstimate, RoutingError> {
        debug!(?origin, ?destination, "requesting distance matrix");

        let body = MatrixRequest {
            locations: vec![
                [origin.longitude, origin.latitude],
                [destination.longitude, destination.latitude],
            ],
            metrics: ["distance", "duration"],
        };

        let url = format!("{}/v2/matrix/driving-car", self.base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?
            .json::<MatrixResponse>()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?;

        let distance_meters = MatrixResponse::cell(&response.distances).ok_or_else(|| {
            RoutingError::Unavailable("matrix response missing distance".to_string())
        })?;
        let duration_seconds = MatrixResponse::cell(&response.durations).ok_or_else(|| {
            RoutingError::Unavailable("matrix response missing duration".to_string())
        })?;

        Ok(estimate_from_matrix(distance_meters, duration_seconds))
    }

    fn tracking_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode=driving",
            origin.latitude, origin.longitude, destination.latitude, destination.longitude
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{OpenRouteClient, estimate_from_matrix};
    use crate::models::delivery::Coordinates;
    use crate::routing::{RoutingError, RoutingProvider};

    fn client(base_url: &str) -> OpenRouteClient {
        OpenRouteClient::new(base_url, "test-key", Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn matrix_values_convert_to_km_and_whole_minutes_rounded_up() {
        let estimate = estimate_from_matrix(12_345.0, 905.0);
        assert_eq!(estimate.distance_km, 12.345);
        assert_eq!(estimate.eta_minutes, 16);
    }

    #[test]
    fn exact_minute_durations_do_not_round_up() {
        let estimate = estimate_from_matrix(1_000.0, 120.0);
        assert_eq!(estimate.distance_km, 1.0);
        assert_eq!(estimate.eta_minutes, 2);
    }

    #[test]
    fn tracking_url_is_lat_lng_ordered() {
        let client = client("http://localhost");
        let url = client.tracking_url(
            Coordinates {
                latitude: 48.85,
                longitude: 2.35,
            },
            Coordinates {
                latitude: 48.86,
                longitude: 2.36,
            },
        );
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=48.85,2.35&destination=48.86,2.36&travelmode=driving"
        );
    }

    #[tokio::test]
    async fn geocode_reads_lng_lat_from_first_feature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/search"))
            .and(query_param("text", "10 Downing Street, London"))
            .and(query_param("size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    { "geometry": { "coordinates": [-0.1278, 51.5074] } }
                ]
            })))
            .mount(&server)
            .await;

        let coords = client(&server.uri())
            .geocode("10 Downing Street, London")
            .await
            .unwrap();

        assert_eq!(coords.latitude, 51.5074);
        assert_eq!(coords.longitude, -0.1278);
    }

    #[tokio::test]
    async fn geocode_with_no_features_is_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "features": [] })))
            .mount(&server)
            .await;

        let err = client(&server.uri()).geocode("nowhere at all").await;
        assert!(matches!(err, Err(RoutingError::NoMatch(_))));
    }

    #[tokio::test]
    async fn geocode_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/search"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client(&server.uri()).geocode("1 Pizza Way").await;
        assert!(matches!(err, Err(RoutingError::Unavailable(_))));
    }

    #[tokio::test]
    async fn matrix_reads_the_origin_destination_cell() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/matrix/driving-car"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "distances": [[0.0, 12345.0], [12345.0, 0.0]],
                "durations": [[0.0, 905.0], [905.0, 0.0]]
            })))
            .mount(&server)
            .await;

        let origin = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        let destination = Coordinates {
            latitude: 48.86,
            longitude: 2.36,
        };

        let estimate = client(&server.uri())
            .distance_and_duration(origin, destination)
            .await
            .unwrap();

        assert_eq!(estimate.distance_km, 12.345);
        assert_eq!(estimate.eta_minutes, 16);
    }

    #[tokio::test]
    async fn matrix_with_null_cell_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/matrix/driving-car"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "distances": [[0.0, null], [null, 0.0]],
                "durations": [[0.0, 905.0], [905.0, 0.0]]
            })))
            .mount(&server)
            .await;

        let origin = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        let destination = Coordinates {
            latitude: 48.86,
            longitude: 2.36,
        };

        let err = client(&server.uri())
            .distance_and_duration(origin, destination)
            .await;
        assert!(matches!(err, Err(RoutingError::Unavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        // Nothing is listening on this port.
        let unreachable = client("http://127.0.0.1:1");
        let err = unreachable.geocode("1 Pizza Way").await;
        assert!(matches!(err, Err(RoutingError::Unavailable(_))));
    }
}
