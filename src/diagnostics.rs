//! API key permission checks
//!
//! Calls each Maps Platform API the browser client depends on once, in a
//! fixed order, and records whether the configured key was accepted.

use axum::http::StatusCode;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use tracing::instrument;

use crate::config::MapsConfig;
use crate::http_client::{redact_error, redact_reqwest_error};
use crate::models::{
    ComputeRoutesRequest, DiagnosticReport, DiagnosticResult, ProbeStatus, TravelMode, Waypoint,
};
use crate::routing::relay::{API_KEY_HEADER, FIELD_MASK_HEADER};
use crate::{Result, RouteGateError};

pub const MAPS_JAVASCRIPT_API: &str = "Maps JavaScript API";
pub const GEOCODING_API: &str = "Geocoding API";
pub const DIRECTIONS_API: &str = "Directions API (Legacy)";
pub const ROUTES_API: &str = "Routes API";

/// How a single probe reaches its endpoint
#[derive(Debug, Clone)]
pub enum ProbeRequest {
    Get { url: Url },
    Post {
        url: Url,
        field_mask: &'static str,
        body: ComputeRoutesRequest,
    },
}

/// One permission check
#[derive(Debug, Clone)]
pub struct Probe {
    pub name: &'static str,
    pub request: ProbeRequest,
    /// Treat `303 See Other` as an accepted key
    pub accepts_see_other: bool,
}

impl Probe {
    fn is_success(&self, status: StatusCode) -> bool {
        status.is_success() || (self.accepts_see_other && status == StatusCode::SEE_OTHER)
    }
}

/// Runs the fixed probe list against the configured endpoints
#[derive(Clone)]
pub struct DiagnosticsProbe {
    client: ClientWithMiddleware,
    api_key: String,
    probes: Vec<Probe>,
}

impl DiagnosticsProbe {
    pub fn new(config: &MapsConfig, client: ClientWithMiddleware) -> Result<Self> {
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            probes: default_probes(config)?,
        })
    }

    /// Run every probe in order. A failing probe never stops the others.
    #[instrument(skip(self))]
    pub async fn check_api_key_permissions(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport::default();

        for probe in &self.probes {
            tracing::info!("Testing API: {}", probe.name);
            let result = self.run(probe).await;
            match &result.status {
                ProbeStatus::Code(status) => {
                    tracing::info!("API {} returned status {}", probe.name, status);
                }
                ProbeStatus::Failed(_) => {
                    tracing::error!("Error testing API {}: {}", probe.name, result.message);
                }
            }
            report.record(probe.name, result);
        }

        tracing::info!(
            probes = report.len(),
            all_succeeded = report.all_succeeded(),
            "API key check finished"
        );
        report
    }

    async fn run(&self, probe: &Probe) -> DiagnosticResult {
        let request = match &probe.request {
            ProbeRequest::Get { url } => self.client.get(url.clone()),
            ProbeRequest::Post {
                url,
                field_mask,
                body,
            } => self
                .client
                .post(url.clone())
                .header(API_KEY_HEADER, &self.api_key)
                .header(FIELD_MASK_HEADER, *field_mask)
                .json(body),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return DiagnosticResult::failed(&redact_error(err).to_string()),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => DiagnosticResult::response(status.as_u16(), probe.is_success(status), &body),
            Err(err) => DiagnosticResult::failed(&redact_reqwest_error(err).to_string()),
        }
    }
}

/// The four checks: three legacy GET endpoints and the Routes API call the
/// relay makes.
pub fn default_probes(config: &MapsConfig) -> Result<Vec<Probe>> {
    let base = &config.maps_api_base_url;
    let key = config.api_key.as_str();

    let routes_body = ComputeRoutesRequest::new(
        Waypoint::coordinates(40.7128, -74.0060),
        Waypoint::coordinates(42.3601, -71.0589),
        TravelMode::Drive,
    );

    Ok(vec![
        Probe {
            name: MAPS_JAVASCRIPT_API,
            request: ProbeRequest::Get {
                url: probe_url(
                    &format!("{base}/maps/api/js"),
                    &[("key", key), ("callback", "initMap")],
                )?,
            },
            accepts_see_other: true,
        },
        Probe {
            name: GEOCODING_API,
            request: ProbeRequest::Get {
                url: probe_url(
                    &format!("{base}/maps/api/geocode/json"),
                    &[("address", "New York"), ("key", key)],
                )?,
            },
            accepts_see_other: false,
        },
        Probe {
            name: DIRECTIONS_API,
            request: ProbeRequest::Get {
                url: probe_url(
                    &format!("{base}/maps/api/directions/json"),
                    &[("origin", "New York"), ("destination", "Boston"), ("key", key)],
                )?,
            },
            accepts_see_other: false,
        },
        Probe {
            name: ROUTES_API,
            request: ProbeRequest::Post {
                url: probe_url(&config.routes_api_url, &[])?,
                field_mask: "routes.duration",
                body: routes_body,
            },
            accepts_see_other: false,
        },
    ])
}

fn probe_url(url: &str, params: &[(&str, &str)]) -> Result<Url> {
    let parsed = if params.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, params)
    };
    parsed.map_err(|err| RouteGateError::config(format!("Invalid probe URL '{url}': {err}")))
}
