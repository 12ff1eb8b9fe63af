//! Automatic replay of a failed submission when connectivity returns.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::connectivity::NetworkState;
use crate::search::SearchController;

/// Watch `network` for the pipeline's lifetime and replay the last failed
/// submission on each transition to online.
///
/// The pending slot is taken (cleared) before the resolver runs, so a second
/// notification arriving mid-replay cannot double-fire; a replay that fails
/// again re-queues itself through the resolver's own failure path. The task
/// ends when the connectivity sender is dropped.
pub fn spawn_retry_on_reconnect(
    controller: SearchController,
    mut network: watch::Receiver<NetworkState>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while network.changed().await.is_ok() {
            let state = *network.borrow_and_update();
            if !state.is_online() {
                continue;
            }
            let Some(query) = controller.take_pending_retry() else {
                continue;
            };
            tracing::info!(%query, "connectivity restored, replaying submission");
            controller.submit_query(&query).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ConnectivityMonitor;
    use crate::search::CONNECTION_LOST_MESSAGE;
    use crate::test_util::{paris_body, wait_until};
    use std::time::Duration;
    use stratus_core::SearchConfig;
    use stratus_weather::GeocodingClient;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Reserve a local port by binding and immediately dropping a listener.
    fn free_local_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        port
    }

    #[tokio::test]
    async fn test_reconnect_replays_exactly_once_and_succeeds() {
        // Phase one: nothing listens on the port, so the submission fails
        // at the transport layer and queues itself.
        let port = free_local_port();
        let geocoder = GeocodingClient::new(
            &format!("http://127.0.0.1:{}/v1/search", port),
            Duration::from_secs(2),
        )
        .unwrap();
        let controller = SearchController::new(geocoder, &SearchConfig::default());

        controller.submit_query("Paris").await;
        assert_eq!(
            controller.snapshot().message.as_deref(),
            Some(CONNECTION_LOST_MESSAGE)
        );
        assert_eq!(controller.pending_retry().as_deref(), Some("Paris"));

        // Phase two: the service comes back on the same port.
        let listener = std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
        let server = MockServer::builder().listener(listener).start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Paris"))
            .respond_with(ResponseTemplate::new(200).set_body_json(paris_body()))
            .expect(1)
            .mount(&server)
            .await;

        let monitor = ConnectivityMonitor::new(NetworkState::OFFLINE);
        let handle = spawn_retry_on_reconnect(controller.clone(), monitor.subscribe());

        monitor.report(NetworkState::ONLINE);
        assert!(
            wait_until(3000, || controller.snapshot().selected.is_some()).await,
            "retry never resolved the pending query"
        );
        assert!(controller.pending_retry().is_none());

        // A second reconnect with no pending query must not replay.
        monitor.report(NetworkState::OFFLINE);
        monitor.report(NetworkState::ONLINE);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(controller.pending_retry().is_none());

        drop(monitor);
        let _ = handle.await;
        // MockServer verifies expect(1) on drop.
    }

    #[tokio::test]
    async fn test_sustained_failure_requeues_on_every_reconnect() {
        let geocoder =
            GeocodingClient::new("http://127.0.0.1:1/v1/search", Duration::from_secs(1)).unwrap();
        let controller = SearchController::new(geocoder, &SearchConfig::default());

        controller.submit_query("Paris").await;
        assert_eq!(controller.pending_retry().as_deref(), Some("Paris"));

        let monitor = ConnectivityMonitor::new(NetworkState::OFFLINE);
        let _handle = spawn_retry_on_reconnect(controller.clone(), monitor.subscribe());

        for _ in 0..2 {
            monitor.report(NetworkState::ONLINE);
            // The slot empties while the replay runs, then refills on failure.
            assert!(
                wait_until(3000, || controller.pending_retry().as_deref() == Some("Paris")).await,
                "failed replay should repopulate the pending slot"
            );
            monitor.report(NetworkState::OFFLINE);
        }

        assert_eq!(
            controller.snapshot().message.as_deref(),
            Some(CONNECTION_LOST_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_offline_transition_does_not_replay() {
        let geocoder =
            GeocodingClient::new("http://127.0.0.1:1/v1/search", Duration::from_secs(1)).unwrap();
        let controller = SearchController::new(geocoder, &SearchConfig::default());
        controller.submit_query("Paris").await;

        let monitor = ConnectivityMonitor::new(NetworkState::ONLINE);
        let _handle = spawn_retry_on_reconnect(controller.clone(), monitor.subscribe());

        // Connected but not reachable is still offline for retry purposes.
        monitor.report(NetworkState {
            is_connected: true,
            is_internet_reachable: false,
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.pending_retry().as_deref(), Some("Paris"));
    }
}
