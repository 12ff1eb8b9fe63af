//! Shared helpers for the crate's async tests.

use std::time::Duration;

/// Poll `predicate` every 10 ms until it holds or `deadline_ms` elapses.
pub(crate) async fn wait_until<F: Fn() -> bool>(deadline_ms: u64, predicate: F) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(deadline_ms);
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    predicate()
}

/// Geocoding body with the two classic Paris candidates, France first.
pub(crate) fn paris_body() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {"id": 1, "name": "Paris", "admin1": "Île-de-France", "country": "France",
             "latitude": 48.85, "longitude": 2.35},
            {"id": 2, "name": "Paris", "admin1": "Texas", "country": "United States",
             "latitude": 33.66, "longitude": -95.55}
        ]
    })
}
