//! Forecast retrieval: current conditions, today's hourly trend, and the
//! weekly daily trend for a coordinate pair.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::FetchError;
use crate::types::{CurrentConditions, DailySample, HourlySample};

const CURRENT_FIELDS: &str = "temperature_2m,weather_code,wind_speed_10m";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,wind_speed_10m";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
    hourly: Option<HourlyBlock>,
    daily: Option<DailyBlock>,
}

/// Parallel arrays zipped by index; a missing value at an index becomes 0.
#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    wind_speed_10m: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
}

impl HourlyBlock {
    fn into_samples(self) -> Vec<HourlySample> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, time)| HourlySample {
                time: time.clone(),
                temperature_2m: self.temperature_2m.get(i).copied().unwrap_or(0.0),
                weather_code: self.weather_code.get(i).copied().unwrap_or(0),
                wind_speed_10m: self.wind_speed_10m.get(i).copied().unwrap_or(0.0),
            })
            .collect()
    }
}

impl DailyBlock {
    fn into_samples(self) -> Vec<DailySample> {
        self.time
            .iter()
            .enumerate()
            .map(|(i, date)| DailySample {
                date: date.clone(),
                temperature_2m_max: self.temperature_2m_max.get(i).copied().unwrap_or(0.0),
                temperature_2m_min: self.temperature_2m_min.get(i).copied().unwrap_or(0.0),
                weather_code: self.weather_code.get(i).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Client for an Open-Meteo compatible forecast endpoint.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Current conditions. `None` when the endpoint has no data.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Option<CurrentConditions>, FetchError> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}",
            self.base_url, latitude, longitude, CURRENT_FIELDS
        );

        let body = self.fetch(url, cancel).await?;
        Ok(body.and_then(|b| b.current))
    }

    /// Today's hourly samples, zipped by index.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn today_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<HourlySample>, FetchError> {
        let url = format!(
            "{}?latitude={}&longitude={}&hourly={}&forecast_days=1&timezone=auto",
            self.base_url, latitude, longitude, HOURLY_FIELDS
        );

        let body = self.fetch(url, cancel).await?;
        Ok(body
            .and_then(|b| b.hourly)
            .map(HourlyBlock::into_samples)
            .unwrap_or_default())
    }

    /// Seven days of daily samples, zipped by index.
    #[instrument(skip(self, cancel), level = "debug")]
    pub async fn weekly_daily(
        &self,
        latitude: f64,
        longitude: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<DailySample>, FetchError> {
        let url = format!(
            "{}?latitude={}&longitude={}&daily={}&forecast_days=7&timezone=auto",
            self.base_url, latitude, longitude, DAILY_FIELDS
        );

        let body = self.fetch(url, cancel).await?;
        Ok(body
            .and_then(|b| b.daily)
            .map(DailyBlock::into_samples)
            .unwrap_or_default())
    }

    /// Shared request path. `Ok(None)` for non-2xx responses.
    async fn fetch(
        &self,
        url: String,
        cancel: &CancellationToken,
    ) -> Result<Option<ForecastResponse>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = self.client.get(&url).send() => result?,
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "forecast request returned non-success");
            return Ok(None);
        }

        let body: ForecastResponse = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = response.json() => result?,
        };

        Ok(Some(body))
    }
}
