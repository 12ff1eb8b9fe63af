//! Weather data access for Stratus.
//!
//! HTTP clients for the geocoding search, forecast, and reverse geocoding
//! endpoints, plus the device position abstraction. All network calls are
//! cancellable and translate non-2xx responses into empty data rather than
//! errors.

pub mod error;
pub mod forecast;
pub mod geocoding;
pub mod position;
pub mod reverse;
pub mod types;

pub use error::{FetchError, PositionError};
pub use forecast::ForecastClient;
pub use geocoding::GeocodingClient;
pub use position::{Position, PositionProvider, UnsupportedPlatform};
pub use reverse::{PlaceName, ReverseGeocoder};
pub use types::{
    CurrentConditions, DailySample, HourlySample, PlaceCandidate, SelectedLocation,
    UNKNOWN_COUNTRY, UNKNOWN_REGION,
};
