//! Translation of a browser route query into a Routes API request

use crate::models::{
    ComputeRoutesRequest, PolylineQuality, RoutingPreference, TransitPreferences,
    TransitRoutingPreference, TravelMode, Waypoint,
};

/// Response fields requested for every route
pub const BASE_FIELD_MASK: &str =
    "routes.duration,routes.distanceMeters,routes.polyline,routes.legs,routes.staticDuration";

/// Extra response fields requested for transit routes
pub const TRANSIT_FIELD_MASK: &str = "routes.legs.steps.transitDetails,routes.legs.stepsOverview";

/// A request body together with the field mask it must be sent with
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRoute {
    pub body: ComputeRoutesRequest,
    pub field_mask: String,
}

/// Field mask for `travel_mode`
#[must_use]
pub fn field_mask(travel_mode: TravelMode) -> String {
    match travel_mode {
        TravelMode::Transit => format!("{BASE_FIELD_MASK},{TRANSIT_FIELD_MASK}"),
        _ => BASE_FIELD_MASK.to_string(),
    }
}

/// Routing preference for `travel_mode`.
///
/// Only motorized modes take one; transit uses its own preference and
/// walking or cycling never consider traffic.
#[must_use]
pub fn routing_preference(
    travel_mode: TravelMode,
    departure_time: Option<&str>,
) -> Option<RoutingPreference> {
    if !travel_mode.is_motorized() {
        return None;
    }
    match departure_time {
        Some(_) => Some(RoutingPreference::TrafficAwareOptimal),
        None => Some(RoutingPreference::TrafficAware),
    }
}

/// Build the `computeRoutes` body and field mask for one route
#[must_use]
pub fn build_route_request(
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: TravelMode,
    departure_time: Option<String>,
) -> PreparedRoute {
    let departure_time = departure_time.filter(|time| !time.is_empty());

    let transit_preferences = (travel_mode == TravelMode::Transit).then_some(TransitPreferences {
        routing_preference: TransitRoutingPreference::LessWalking,
    });

    let body = ComputeRoutesRequest {
        polyline_quality: Some(PolylineQuality::HighQuality),
        routing_preference: routing_preference(travel_mode, departure_time.as_deref()),
        transit_preferences,
        departure_time,
        ..ComputeRoutesRequest::new(origin, destination, travel_mode)
    };

    PreparedRoute {
        body,
        field_mask: field_mask(travel_mode),
    }
}
