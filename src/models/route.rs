//! Route request models, inbound from the browser and outbound to the Routes API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::RouteGateError;

/// Travel modes understood by the Routes API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Walk,
    Bicycle,
    Transit,
    TwoWheeler,
}

impl TravelMode {
    pub const ALL: [TravelMode; 5] = [
        TravelMode::Drive,
        TravelMode::Walk,
        TravelMode::Bicycle,
        TravelMode::Transit,
        TravelMode::TwoWheeler,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Drive => "DRIVE",
            TravelMode::Walk => "WALK",
            TravelMode::Bicycle => "BICYCLE",
            TravelMode::Transit => "TRANSIT",
            TravelMode::TwoWheeler => "TWO_WHEELER",
        }
    }

    /// Traffic does not apply to walking or cycling
    #[must_use]
    pub fn is_motorized(self) -> bool {
        matches!(self, TravelMode::Drive | TravelMode::TwoWheeler)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = RouteGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| RouteGateError::invalid_travel_mode(s))
    }
}

/// Traffic handling requested from the Routes API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingPreference {
    TrafficAware,
    TrafficAwareOptimal,
}

/// Transit-only routing preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitRoutingPreference {
    LessWalking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitPreferences {
    pub routing_preference: TransitRoutingPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolylineQuality {
    HighQuality,
}

/// Origin or destination of a route.
///
/// Held as the JSON the browser sent, so every Routes API waypoint field
/// (`sideOfRoad`, `via`, `location.heading`, ...) reaches upstream
/// unchanged. Only presence is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Waypoint(Value);

impl Waypoint {
    #[must_use]
    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self(json!({
            "location": { "latLng": { "latitude": latitude, "longitude": longitude } }
        }))
    }

    #[must_use]
    pub fn address<S: Into<String>>(address: S) -> Self {
        Self(json!({ "address": address.into() }))
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Body of `POST /api/route` as sent by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    pub origin: Option<Waypoint>,
    pub destination: Option<Waypoint>,
    pub travel_mode: Option<String>,
    pub routing_preference: Option<String>,
    pub departure_time: Option<String>,
}

/// Body of a `directions/v2:computeRoutes` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRoutesRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub travel_mode: TravelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyline_quality: Option<PolylineQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_preference: Option<RoutingPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_preferences: Option<TransitPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

impl ComputeRoutesRequest {
    /// Bare request with no preferences set
    #[must_use]
    pub fn new(origin: Waypoint, destination: Waypoint, travel_mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            travel_mode,
            polyline_quality: None,
            routing_preference: None,
            transit_preferences: None,
            departure_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DRIVE", TravelMode::Drive)]
    #[case("WALK", TravelMode::Walk)]
    #[case("BICYCLE", TravelMode::Bicycle)]
    #[case("TRANSIT", TravelMode::Transit)]
    #[case("TWO_WHEELER", TravelMode::TwoWheeler)]
    fn test_travel_mode_parses_upstream_names(#[case] raw: &str, #[case] expected: TravelMode) {
        assert_eq!(raw.parse::<TravelMode>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    #[case("FLY")]
    #[case("drive")]
    #[case("")]
    fn test_travel_mode_rejects_unknown(#[case] raw: &str) {
        let err = raw.parse::<TravelMode>().unwrap_err();
        assert!(matches!(err, RouteGateError::InvalidTravelMode { .. }));
    }

    #[test]
    fn test_waypoint_keeps_unmodelled_fields() {
        let raw = json!({
            "location": {
                "latLng": { "latitude": 40.7128, "longitude": -74.006 },
                "heading": 90
            },
            "sideOfRoad": true,
            "vehicleStopover": true
        });
        let waypoint: Waypoint = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(waypoint.as_value(), &raw);
        assert_eq!(serde_json::to_value(&waypoint).unwrap(), raw);
    }

    #[test]
    fn test_null_waypoint_counts_as_missing() {
        let query: RouteQuery = serde_json::from_value(json!({
            "origin": null,
            "destination": "Boston, MA"
        }))
        .unwrap();

        assert!(query.origin.is_none());
        assert_eq!(
            query.destination.map(|waypoint| waypoint.as_value().clone()),
            Some(json!("Boston, MA"))
        );
    }

    #[test]
    fn test_route_query_fields_are_optional() {
        let query: RouteQuery = serde_json::from_value(json!({})).unwrap();
        assert!(query.origin.is_none());
        assert!(query.travel_mode.is_none());
        assert!(query.departure_time.is_none());
    }

    #[test]
    fn test_compute_routes_request_omits_unset_fields() {
        let request = ComputeRoutesRequest::new(
            Waypoint::address("Boston"),
            Waypoint::address("New York"),
            TravelMode::Walk,
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "origin": { "address": "Boston" },
                "destination": { "address": "New York" },
                "travelMode": "WALK"
            })
        );
    }
}
