//! `RouteGate` - route-calculation gateway for the Google Routes API
//!
//! This library relays browser route requests to the Routes API with the
//! request shape each travel mode needs, and checks which Maps Platform
//! APIs the configured key can reach.

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http_client;
pub mod models;
pub mod routing;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use crate::config::RouteGateConfig;
pub use diagnostics::DiagnosticsProbe;
pub use error::RouteGateError;
pub use models::{DiagnosticReport, RouteQuery, TravelMode, Waypoint};
pub use routing::{PreparedRoute, RouteResult, RoutesRelay};
pub use web::{AppState, app};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, RouteGateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
