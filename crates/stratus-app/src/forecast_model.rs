//! Forecast data keyed to the selected location.
//!
//! The three views (current conditions, today's hourly trend, weekly trend)
//! share one behavior: whenever the selected location changes, the fetch in
//! flight for the previous location is cancelled before a new one starts.
//! This model implements that once, observing the pipeline's
//! selected-location channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use stratus_weather::{
    CurrentConditions, DailySample, ForecastClient, HourlySample, SelectedLocation,
};

/// Shown when no location is selected and the pipeline has no message.
pub const SELECT_LOCATION_HINT: &str = "Select a location to see the weather.";
pub const NO_CURRENT_MESSAGE: &str = "No current weather available.";
pub const NO_HOURLY_MESSAGE: &str = "No hourly weather available.";
pub const NO_DAILY_MESSAGE: &str = "No daily weather available.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather.";

/// Snapshot of the forecast views' state.
#[derive(Debug, Clone, Default)]
pub struct ForecastState {
    pub location: Option<SelectedLocation>,
    pub current: Option<CurrentConditions>,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySample>,
    pub loading: bool,
    pub message: Option<String>,
}

struct ModelInner {
    state: Mutex<ForecastState>,
    client: ForecastClient,
    cancel: Mutex<Option<CancellationToken>>,
}

/// Holds the forecast data for the currently selected location.
#[derive(Clone)]
pub struct ForecastModel {
    inner: Arc<ModelInner>,
}

impl ForecastModel {
    pub fn new(client: ForecastClient) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                state: Mutex::new(ForecastState {
                    message: Some(SELECT_LOCATION_HINT.to_string()),
                    ..ForecastState::default()
                }),
                client,
                cancel: Mutex::new(None),
            }),
        }
    }

    /// Snapshot of the observable state.
    pub fn snapshot(&self) -> ForecastState {
        self.inner.state.lock().clone()
    }

    /// Track `selected` for the model's lifetime, re-fetching on every
    /// change. The task ends when the sending side is dropped.
    pub fn spawn(&self, mut selected: watch::Receiver<Option<SelectedLocation>>) -> JoinHandle<()> {
        let model = self.clone();
        tokio::spawn(async move {
            loop {
                let location = selected.borrow_and_update().clone();
                model.on_location_change(location);
                if selected.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// React to a location replacement. Cancels the previous generation's
    /// fetch before anything else; the cancelled generation can no longer
    /// write state.
    pub fn on_location_change(&self, location: Option<SelectedLocation>) {
        if let Some(token) = self.inner.cancel.lock().take() {
            token.cancel();
        }

        let Some(location) = location else {
            let mut state = self.inner.state.lock();
            state.location = None;
            state.current = None;
            state.hourly.clear();
            state.daily.clear();
            state.loading = false;
            state.message = Some(SELECT_LOCATION_HINT.to_string());
            return;
        };

        let token = CancellationToken::new();
        *self.inner.cancel.lock() = Some(token.clone());

        {
            let mut state = self.inner.state.lock();
            state.location = Some(location.clone());
            state.loading = true;
            state.message = None;
        }

        let model = self.clone();
        tokio::spawn(async move {
            model.fetch_all(location, token).await;
        });
    }

    async fn fetch_all(self, location: SelectedLocation, token: CancellationToken) {
        let (lat, lon) = (location.latitude, location.longitude);
        let (current, hourly, daily) = tokio::join!(
            self.inner.client.current(lat, lon, &token),
            self.inner.client.today_hourly(lat, lon, &token),
            self.inner.client.weekly_daily(lat, lon, &token),
        );

        let mut state = self.inner.state.lock();
        if token.is_cancelled() {
            return;
        }
        state.loading = false;
        match (current, hourly, daily) {
            (Ok(current), Ok(hourly), Ok(daily)) => {
                state.current = current;
                state.hourly = hourly;
                state.daily = daily;
                state.message = if state.current.is_none() {
                    Some(NO_CURRENT_MESSAGE.to_string())
                } else if state.hourly.is_empty() {
                    Some(NO_HOURLY_MESSAGE.to_string())
                } else if state.daily.is_empty() {
                    Some(NO_DAILY_MESSAGE.to_string())
                } else {
                    None
                };
            }
            _ => {
                state.current = None;
                state.hourly.clear();
                state.daily.clear();
                state.message = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
    }
}
