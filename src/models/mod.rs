//! Data models for the RouteGate service
//!
//! This module contains the wire models organized by concern:
//! - Route: browser route queries and Routes API request bodies
//! - Diagnostics: API key probe results

pub mod diagnostics;
pub mod route;

// Re-export all public types for convenient access
pub use diagnostics::{DiagnosticReport, DiagnosticResult, ProbeStatus};
pub use route::{
    ComputeRoutesRequest, PolylineQuality, RouteQuery, RoutingPreference,
    TransitPreferences, TransitRoutingPreference, TravelMode, Waypoint,
};
