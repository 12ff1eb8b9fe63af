//! Observable state owned by the search pipeline.

use stratus_weather::{PlaceCandidate, SelectedLocation};

/// Snapshot of the search pipeline's state.
///
/// `selected` and `message` are mutually exclusive in display: a selection
/// clears the message and a message implies no selection. Both may be
/// transiently `None` while a resolution is in flight.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Source of truth for the text input.
    pub query: String,
    pub selected: Option<SelectedLocation>,
    pub message: Option<String>,
    pub suggestions: Vec<PlaceCandidate>,
    pub suggestions_loading: bool,
    pub suggestions_visible: bool,
    /// True while the device-location flow runs.
    pub locating: bool,
}
