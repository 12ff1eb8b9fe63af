//! The location search pipeline: debounced suggestion fetching, exact-match
//! submission, and the pending-retry slot drained on reconnect.
//!
//! Race discipline: every debounce cycle and every submission carries its
//! own `CancellationToken`. A newer keystroke or submission cancels the
//! previous token, and a completion only writes state while holding the
//! state lock with its token still uncancelled. A response belonging to a
//! superseded cycle can therefore never overwrite newer state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use stratus_core::SearchConfig;
use stratus_weather::{FetchError, GeocodingClient, PlaceCandidate, SelectedLocation};

use crate::state::SearchState;

/// Shown when a submission finds no exact match among the candidates.
pub const NO_RESULT_MESSAGE: &str = "Couldn't find any result.";

/// Shown when a submission fails at the transport layer.
pub const CONNECTION_LOST_MESSAGE: &str =
    "The service connection is lost, please check your internet connection or try again later";

#[derive(Debug, Clone, Copy)]
struct Tuning {
    min_query_chars: usize,
    debounce: Duration,
    suggestion_limit: u32,
    submit_limit: u32,
}

pub(crate) struct Inner {
    pub(crate) state: Mutex<SearchState>,
    pub(crate) geocoder: GeocodingClient,
    pub(crate) selected_tx: watch::Sender<Option<SelectedLocation>>,
    pub(crate) suggest_cancel: Mutex<Option<CancellationToken>>,
    pub(crate) submit_cancel: Mutex<Option<CancellationToken>>,
    pub(crate) pending_retry: Mutex<Option<String>>,
    tuning: Tuning,
}

/// Owns the pipeline state. Cheap to clone; all clones share it.
#[derive(Clone)]
pub struct SearchController {
    pub(crate) inner: Arc<Inner>,
}

/// Trim, lowercase, and collapse internal whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl SearchController {
    pub fn new(geocoder: GeocodingClient, config: &SearchConfig) -> Self {
        let (selected_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SearchState::default()),
                geocoder,
                selected_tx,
                suggest_cancel: Mutex::new(None),
                submit_cancel: Mutex::new(None),
                pending_retry: Mutex::new(None),
                tuning: Tuning {
                    min_query_chars: config.min_query_chars as usize,
                    debounce: Duration::from_millis(config.debounce_ms),
                    suggestion_limit: config.suggestion_limit,
                    submit_limit: config.submit_limit,
                },
            }),
        }
    }

    /// Snapshot of the observable state.
    pub fn snapshot(&self) -> SearchState {
        self.inner.state.lock().clone()
    }

    /// Observe the selected location; fires on every replacement.
    pub fn watch_selected(&self) -> watch::Receiver<Option<SelectedLocation>> {
        self.inner.selected_tx.subscribe()
    }

    /// Last failed submission text, if any.
    pub fn pending_retry(&self) -> Option<String> {
        self.inner.pending_retry.lock().clone()
    }

    pub(crate) fn take_pending_retry(&self) -> Option<String> {
        self.inner.pending_retry.lock().take()
    }

    /// Record an edit to the search text. Drives the suggestion debouncer;
    /// must be called from within a Tokio runtime.
    pub fn set_query(&self, text: &str) {
        let trimmed = text.trim().to_string();

        let mut state = self.inner.state.lock();
        state.query = text.to_string();
        state.suggestions_visible = !trimmed.is_empty();

        // The previous cycle is dead the moment the query changes.
        if let Some(token) = self.inner.suggest_cancel.lock().take() {
            token.cancel();
        }

        if trimmed.chars().count() < self.inner.tuning.min_query_chars {
            state.suggestions.clear();
            state.suggestions_loading = false;
            return;
        }
        drop(state);

        let token = CancellationToken::new();
        *self.inner.suggest_cancel.lock() = Some(token.clone());

        let this = self.clone();
        tokio::spawn(async move {
            this.run_suggestion_cycle(trimmed, token).await;
        });
    }

    async fn run_suggestion_cycle(self, query: String, token: CancellationToken) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.inner.tuning.debounce) => {}
        }

        {
            let mut state = self.inner.state.lock();
            if token.is_cancelled() {
                return;
            }
            state.suggestions_loading = true;
        }

        let result = self
            .inner
            .geocoder
            .search(&query, self.inner.tuning.suggestion_limit, &token)
            .await;

        let mut state = self.inner.state.lock();
        if token.is_cancelled() {
            return;
        }
        match result {
            Ok(results) => {
                state.suggestions = results;
                state.suggestions_loading = false;
            }
            Err(FetchError::Cancelled) => {}
            Err(err) => {
                // Suggestions are advisory; fail silent.
                tracing::debug!("suggestion fetch failed: {err}");
                state.suggestions.clear();
                state.suggestions_loading = false;
            }
        }
    }

    /// Adopt a tapped suggestion as the selected location.
    pub fn select_candidate(&self, candidate: &PlaceCandidate) {
        let location = SelectedLocation::from(candidate);
        let mut state = self.inner.state.lock();
        self.adopt_location(&mut state, location.clone());
        drop(state);
        self.inner.selected_tx.send_replace(Some(location));
    }

    /// Resolve the current search text as an explicit submission.
    pub async fn submit(&self) {
        let query = self.inner.state.lock().query.clone();
        self.submit_query(&query).await;
    }

    /// Resolve `raw` to exactly one location or report failure. Never falls
    /// back to an inexact candidate, and never clears the typed text on
    /// failure.
    pub async fn submit_query(&self, raw: &str) {
        let query = raw.trim().to_string();
        if query.is_empty() {
            return;
        }

        {
            let mut state = self.inner.state.lock();
            state.suggestions_visible = false;
            // A newer submission supersedes any in-flight one.
            if let Some(token) = self.inner.submit_cancel.lock().take() {
                token.cancel();
            }
        }
        let token = CancellationToken::new();
        *self.inner.submit_cancel.lock() = Some(token.clone());

        let result = self
            .inner
            .geocoder
            .search(&query, self.inner.tuning.submit_limit, &token)
            .await;

        match result {
            Ok(candidates) => {
                let exact = find_exact_match(&query, candidates);

                let mut state = self.inner.state.lock();
                if token.is_cancelled() {
                    return;
                }
                match exact {
                    Some(candidate) => {
                        // A resolved query has nothing left to retry.
                        *self.inner.pending_retry.lock() = None;
                        let location = SelectedLocation::from(&candidate);
                        self.adopt_location(&mut state, location.clone());
                        drop(state);
                        self.inner.selected_tx.send_replace(Some(location));
                    }
                    None => {
                        state.selected = None;
                        state.message = Some(NO_RESULT_MESSAGE.to_string());
                        drop(state);
                        self.inner.selected_tx.send_replace(None);
                    }
                }
            }
            Err(FetchError::Cancelled) => {}
            Err(err) => {
                tracing::warn!("submission lookup failed: {err}");
                let mut state = self.inner.state.lock();
                if token.is_cancelled() {
                    return;
                }
                state.selected = None;
                state.message = Some(CONNECTION_LOST_MESSAGE.to_string());
                drop(state);
                self.inner.selected_tx.send_replace(None);
                // Queued for the reconnect task.
                *self.inner.pending_retry.lock() = Some(query);
            }
        }
    }

    /// Install `location` and reset the search surface around it.
    pub(crate) fn adopt_location(&self, state: &mut SearchState, location: SelectedLocation) {
        state.selected = Some(location);
        state.message = None;
        state.query.clear();
        state.suggestions.clear();
        state.suggestions_loading = false;
        state.suggestions_visible = false;
        if let Some(token) = self.inner.suggest_cancel.lock().take() {
            token.cancel();
        }
    }
}

/// First candidate whose normalized name, region, country, or
/// "name, region, country" concatenation equals the normalized query.
/// Candidate order is the service's own ranking and is preserved.
fn find_exact_match(query: &str, candidates: Vec<PlaceCandidate>) -> Option<PlaceCandidate> {
    let normalized = normalize(query);
    candidates.into_iter().find(|candidate| {
        let name = normalize(&candidate.name);
        let region = normalize(candidate.admin1.as_deref().unwrap_or(""));
        let country = normalize(candidate.country.as_deref().unwrap_or(""));
        let full = normalize(&format!(
            "{}, {}, {}",
            candidate.name,
            candidate.admin1.as_deref().unwrap_or(""),
            candidate.country.as_deref().unwrap_or("")
        ));
        name == normalized || region == normalized || country == normalized || full == normalized
    })
}
