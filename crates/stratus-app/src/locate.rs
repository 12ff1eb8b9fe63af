//! Device-location acquisition: permission, position fix, reverse geocode.
//!
//! One-shot flow run at startup and again on an explicit "locate me"
//! action. Failures degrade to a message; only a fully resolved chain
//! replaces the selected location.

use tokio_util::sync::CancellationToken;

use stratus_weather::{
    PositionProvider, ReverseGeocoder, SelectedLocation, UNKNOWN_COUNTRY, UNKNOWN_REGION,
};

use crate::search::SearchController;

/// Shown when the user has denied foreground location access.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Location permission denied. Please allow location access.";

/// Shown when the fix or the reverse geocode fails for any other reason.
pub const LOCATION_FAILED_MESSAGE: &str = "Unable to get your location.";

/// City shown when reverse geocoding has no name for the fix.
pub const FALLBACK_CITY: &str = "Current location";

impl SearchController {
    /// Populate the selected location from the device's current position.
    pub async fn locate<P: PositionProvider>(&self, provider: &P, reverse: &ReverseGeocoder) {
        self.inner.state.lock().locating = true;

        let position = match provider.current_position().await {
            Ok(position) => position,
            Err(err) => {
                let message = if err.is_permission_denied() {
                    PERMISSION_DENIED_MESSAGE
                } else {
                    tracing::warn!("position fix failed: {err}");
                    LOCATION_FAILED_MESSAGE
                };
                self.fail_locate(message);
                return;
            }
        };

        let cancel = CancellationToken::new();
        let place = match reverse
            .lookup(position.latitude, position.longitude, &cancel)
            .await
        {
            Ok(place) => place,
            Err(err) => {
                tracing::warn!("reverse geocode failed: {err}");
                self.fail_locate(LOCATION_FAILED_MESSAGE);
                return;
            }
        };

        let (city, region, country) = match place {
            Some(place) => (place.city, place.region, place.country),
            None => (None, None, None),
        };
        let location = SelectedLocation {
            city: city.unwrap_or_else(|| FALLBACK_CITY.to_string()),
            region: region.unwrap_or_else(|| UNKNOWN_REGION.to_string()),
            country: country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            latitude: position.latitude,
            longitude: position.longitude,
        };

        let mut state = self.inner.state.lock();
        self.adopt_location(&mut state, location.clone());
        state.locating = false;
        drop(state);
        self.inner.selected_tx.send_replace(Some(location));
    }

    fn fail_locate(&self, message: &str) {
        let mut state = self.inner.state.lock();
        state.selected = None;
        state.message = Some(message.to_string());
        state.locating = false;
        drop(state);
        self.inner.selected_tx.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::time::Duration;
    use stratus_core::SearchConfig;
    use stratus_weather::{GeocodingClient, Position, PositionError};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedPosition;

    impl PositionProvider for FixedPosition {
        fn current_position(
            &self,
        ) -> impl Future<Output = Result<Position, PositionError>> + Send {
            async {
                Ok(Position {
                    latitude: 47.6062,
                    longitude: -122.3321,
                    accuracy_meters: Some(10.0),
                })
            }
        }
    }

    struct Denied;

    impl PositionProvider for Denied {
        fn current_position(
            &self,
        ) -> impl Future<Output = Result<Position, PositionError>> + Send {
            async { Err(PositionError::PermissionDenied) }
        }
    }

    fn controller() -> SearchController {
        let geocoder =
            GeocodingClient::new("http://127.0.0.1:1/v1/search", Duration::from_secs(1)).unwrap();
        SearchController::new(geocoder, &SearchConfig::default())
    }

    fn reverse_for(server: &MockServer) -> ReverseGeocoder {
        ReverseGeocoder::new(
            &format!("{}/reverse", server.uri()),
            "stratus-tests",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_locate_populates_selection_from_reverse_geocode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "address": {
                    "city": "Seattle",
                    "state": "Washington",
                    "country": "United States"
                }
            })))
            .mount(&server)
            .await;

        let controller = controller();
        controller.set_query("leftover text");
        controller.locate(&FixedPosition, &reverse_for(&server)).await;

        let state = controller.snapshot();
        let selected = state.selected.expect("selection expected");
        assert_eq!(selected.city, "Seattle");
        assert_eq!(selected.region, "Washington");
        assert_eq!(selected.latitude, 47.6062);
        assert!(state.message.is_none());
        assert!(state.query.is_empty());
        assert!(!state.locating);
    }

    #[tokio::test]
    async fn test_locate_falls_back_when_no_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let controller = controller();
        controller.locate(&FixedPosition, &reverse_for(&server)).await;

        let selected = controller.snapshot().selected.expect("selection expected");
        assert_eq!(selected.city, FALLBACK_CITY);
        assert_eq!(selected.region, UNKNOWN_REGION);
        assert_eq!(selected.country, UNKNOWN_COUNTRY);
    }

    #[tokio::test]
    async fn test_permission_denied_sets_specific_message() {
        let server = MockServer::start().await;
        let controller = controller();
        controller.locate(&Denied, &reverse_for(&server)).await;

        let state = controller.snapshot();
        assert!(state.selected.is_none());
        assert_eq!(state.message.as_deref(), Some(PERMISSION_DENIED_MESSAGE));
        assert!(!state.locating);
    }

    #[tokio::test]
    async fn test_reverse_transport_failure_sets_generic_message() {
        let reverse = ReverseGeocoder::new(
            "http://127.0.0.1:1/reverse",
            "stratus-tests",
            Duration::from_secs(1),
        )
        .unwrap();

        let controller = controller();
        controller.locate(&FixedPosition, &reverse).await;

        let state = controller.snapshot();
        assert!(state.selected.is_none());
        assert_eq!(state.message.as_deref(), Some(LOCATION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_unavailable_service_sets_generic_message() {
        let server = MockServer::start().await;
        let controller = controller();
        controller
            .locate(&stratus_weather::UnsupportedPlatform, &reverse_for(&server))
            .await;

        assert_eq!(
            controller.snapshot().message.as_deref(),
            Some(LOCATION_FAILED_MESSAGE)
        );
    }
}
