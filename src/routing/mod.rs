//! Route calculation gateway
//!
//! Validates browser route queries, shapes them into Routes API requests
//! and relays them upstream.

pub mod payload;
pub mod relay;

pub use payload::{PreparedRoute, build_route_request};
pub use relay::{RouteResult, RoutesRelay};

use crate::models::{RouteQuery, TravelMode};
use crate::{Result, RouteGateError};

/// Validate a route query and build the upstream request for it.
///
/// The travel mode defaults to `DRIVE`, also when sent as `null`. A `null`
/// origin or destination is reported as missing. A client-supplied routing
/// preference is ignored: the travel mode and departure time decide it.
pub fn prepare_route(query: RouteQuery) -> Result<PreparedRoute> {
    let travel_mode = match query.travel_mode.as_deref() {
        Some(raw) => raw.parse::<TravelMode>()?,
        None => TravelMode::default(),
    };

    let origin = query
        .origin
        .ok_or_else(|| RouteGateError::validation("Missing required field: origin"))?;
    let destination = query
        .destination
        .ok_or_else(|| RouteGateError::validation("Missing required field: destination"))?;

    if let Some(requested) = &query.routing_preference {
        tracing::debug!(%requested, %travel_mode, "Client routing preference overridden");
    }

    Ok(build_route_request(
        origin,
        destination,
        travel_mode,
        query.departure_time,
    ))
}
