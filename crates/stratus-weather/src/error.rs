//! Error types for weather data access.

use thiserror::Error;

/// Errors from the HTTP clients.
///
/// Non-2xx responses are not errors — they surface as empty data. The only
/// variants are a deliberate cancellation and a transport failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The operation's cancellation token fired before it completed.
    /// Callers must not touch shared state when they see this.
    #[error("request cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    /// True when the failure came from the transport rather than a
    /// deliberate cancellation; these are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Device position errors.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location service unavailable")]
    ServiceUnavailable,

    #[error("position fix timed out")]
    Timeout,

    #[error("location error: {0}")]
    Other(String),
}

impl PositionError {
    /// Permission denials need the user to act at the OS level; nothing in
    /// the app can recover them.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, PositionError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_not_retryable() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::Cancelled.is_retryable());
    }

    #[test]
    fn test_position_error_display() {
        assert_eq!(
            PositionError::PermissionDenied.to_string(),
            "location permission denied"
        );
        assert!(PositionError::Other("no fix".into())
            .to_string()
            .contains("no fix"));
    }

    #[test]
    fn test_permission_denied_flag() {
        assert!(PositionError::PermissionDenied.is_permission_denied());
        assert!(!PositionError::Timeout.is_permission_denied());
    }
}
