use axum::http::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{Value, json};
use tracing::instrument;

use super::payload::PreparedRoute;
use crate::config::MapsConfig;
use crate::{Result, RouteGateError};

pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";
pub const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Longest upstream body excerpt written to the log
const LOG_PREVIEW_CHARS: usize = 500;

/// Upstream JSON relayed to the browser together with its status
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub status: StatusCode,
    pub body: Value,
}

/// Sends prepared routes to the Routes API, one call per request
#[derive(Clone)]
pub struct RoutesRelay {
    client: ClientWithMiddleware,
    routes_api_url: String,
    api_key: String,
}

impl RoutesRelay {
    pub fn new(config: &MapsConfig, client: ClientWithMiddleware) -> Self {
        Self {
            client,
            routes_api_url: config.routes_api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    #[instrument(skip(self, route), fields(travel_mode = %route.body.travel_mode))]
    pub async fn compute_routes(&self, route: &PreparedRoute) -> Result<RouteResult> {
        match &route.body.departure_time {
            Some(time) => tracing::info!("Using departure time: {}", time),
            None => tracing::info!("No departure time specified, using current traffic"),
        }
        tracing::debug!(
            field_mask = %route.field_mask,
            "Sending request to Routes API: {}",
            serde_json::to_string(&route.body)?
        );

        let response = self
            .client
            .post(&self.routes_api_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, &route.field_mask)
            .json(&route.body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::info!(status = status.as_u16(), "Routes API responded");
        tracing::debug!(
            "Routes API response content: {}",
            text.chars().take(LOG_PREVIEW_CHARS).collect::<String>()
        );

        if !status.is_success() {
            return Err(RouteGateError::upstream(status, error_details(&text)));
        }

        let body = serde_json::from_str(&text)?;
        Ok(RouteResult { status, body })
    }
}

/// Parsed upstream error body, or a placeholder when there is nothing to parse
fn error_details(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({ "message": "No response content" });
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": text }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_details_parses_json() {
        let details = error_details(r#"{"error":{"code":403,"status":"PERMISSION_DENIED"}}"#);
        assert_eq!(details["error"]["status"], "PERMISSION_DENIED");
    }

    #[test]
    fn test_error_details_placeholder_for_empty_body() {
        assert_eq!(
            error_details("  "),
            json!({ "message": "No response content" })
        );
    }

    #[test]
    fn test_error_details_wraps_plain_text() {
        assert_eq!(
            error_details("Bad Gateway"),
            json!({ "message": "Bad Gateway" })
        );
    }
}
