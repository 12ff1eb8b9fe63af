//! Forward geocoding: free-text place search.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::FetchError;
use crate::types::PlaceCandidate;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<PlaceCandidate>>,
}

/// Client for an Open-Meteo compatible geocoding search endpoint.
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// `base_url` is the search endpoint itself, e.g. the Open-Meteo
    /// geocoding `/v1/search` URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Search for places matching `query`, capped at `count` results.
    ///
    /// Returns an empty list for non-2xx responses and for responses without
    /// a `results` field. Returns [`FetchError::Cancelled`] — and nothing
    /// else happens — if `cancel` fires first.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn search(
        &self,
        query: &str,
        count: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<PlaceCandidate>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let url = format!(
            "{}?name={}&count={}&format=json",
            self.base_url,
            urlencoding::encode(query),
            count
        );

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.client.get(&url).send() => result?,
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "geocoding search returned non-success");
            return Ok(Vec::new());
        }

        let body: SearchResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = response.json() => result?,
        };

        Ok(body.results.unwrap_or_default())
    }
}
