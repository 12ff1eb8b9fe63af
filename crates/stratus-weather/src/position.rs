//! Device position access.
//!
//! Platform integrations implement [`PositionProvider`]; the crate ships a
//! stub for builds without one, mirroring how unsupported platforms report
//! the service as unavailable rather than failing to compile.

use std::future::Future;

use crate::error::PositionError;

/// A high-accuracy device position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

/// Source of device position fixes.
///
/// Implementations request foreground location permission as part of
/// acquiring the fix; a denial surfaces as
/// [`PositionError::PermissionDenied`].
pub trait PositionProvider: Send + Sync {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Position, PositionError>> + Send;
}

/// Fallback provider for platforms without a location integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedPlatform;

impl PositionProvider for UnsupportedPlatform {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Position, PositionError>> + Send {
        async { Err(PositionError::ServiceUnavailable) }
    }
}
