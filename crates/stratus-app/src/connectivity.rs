//! Network-state observation.
//!
//! Platform glue owns a [`ConnectivityMonitor`] and reports each device
//! notification into it; consumers subscribe to the receiver side and react
//! to transitions.

use tokio::sync::watch;

/// Link and reachability state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkState {
    pub is_connected: bool,
    pub is_internet_reachable: bool,
}

impl NetworkState {
    pub const ONLINE: Self = Self {
        is_connected: true,
        is_internet_reachable: true,
    };

    pub const OFFLINE: Self = Self {
        is_connected: false,
        is_internet_reachable: false,
    };

    /// Both link-connected and internet-reachable.
    pub fn is_online(self) -> bool {
        self.is_connected && self.is_internet_reachable
    }
}

/// Feed of network-state transitions.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<NetworkState>,
}

impl ConnectivityMonitor {
    pub fn new(initial: NetworkState) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }

    /// Record a platform notification.
    pub fn report(&self, state: NetworkState) {
        self.tx.send_replace(state);
    }
}
