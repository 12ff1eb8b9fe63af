//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses a Nominatim-compatible endpoint - free, no API key required.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Resolved place names for a coordinate pair. Any field may be absent;
/// the caller chooses the fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceName {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// Client for a Nominatim-compatible reverse geocoding endpoint.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    /// Nominatim requires an identifying User-Agent.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Reverse geocode coordinates to place names.
    ///
    /// `Ok(None)` means the service answered but has no usable address for
    /// the point; transport failures are errors.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Option<PlaceName>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let url = format!(
            "{}?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
            self.base_url, latitude, longitude
        );

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.client.get(&url).send() => result?,
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "reverse geocode returned non-success");
            return Ok(None);
        }

        let body: ReverseResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = response.json() => result?,
        };

        let Some(addr) = body.address else {
            return Ok(None);
        };

        // Prefer city > town > village > municipality for the place name
        let city = addr.city.or(addr.town).or(addr.village).or(addr.municipality);
        let region = addr.state.or(addr.county);

        Ok(Some(PlaceName {
            city,
            region,
            country: addr.country,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ReverseGeocoder {
        ReverseGeocoder::new(
            &format!("{}/reverse", server.uri()),
            "stratus-tests",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_maps_address_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "json"))
            .and(query_param("addressdetails", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {
                    "city": "Seattle",
                    "state": "Washington",
                    "country": "United States"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        let place = client.lookup(47.6062, -122.3321, &cancel).await.unwrap();

        let place = place.unwrap();
        assert_eq!(place.city.as_deref(), Some("Seattle"));
        assert_eq!(place.region.as_deref(), Some("Washington"));
        assert_eq!(place.country.as_deref(), Some("United States"));
    }

    #[tokio::test]
    async fn test_town_is_used_when_city_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {
                    "town": "Gornau",
                    "county": "Erzgebirgskreis",
                    "country": "Germany"
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        let place = client.lookup(50.7, 13.0, &cancel).await.unwrap().unwrap();

        assert_eq!(place.city.as_deref(), Some("Gornau"));
        assert_eq!(place.region.as_deref(), Some("Erzgebirgskreis"));
    }

    #[tokio::test]
    async fn test_missing_address_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        assert!(client.lookup(0.0, 0.0, &cancel).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let cancel = CancellationToken::new();
        assert!(client.lookup(0.0, 0.0, &cancel).await.unwrap().is_none());
    }
}
