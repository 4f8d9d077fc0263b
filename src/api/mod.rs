use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;

use crate::{
    Result, RouteGateError,
    models::{DiagnosticReport, RouteQuery},
    routing,
    web::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/route", post(calculate_route))
        .route("/check-key", get(check_key))
}

async fn calculate_route(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RouteQuery>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(query) =
        payload.map_err(|rejection| RouteGateError::validation(rejection.body_text()))?;
    tracing::info!(
        travel_mode = query.travel_mode.as_deref().unwrap_or("DRIVE"),
        departure_time = query.departure_time.as_deref(),
        "Received route request"
    );

    let route = routing::prepare_route(query)?;
    let result = state.relay.compute_routes(&route).await?;
    Ok((result.status, Json(result.body)))
}

async fn check_key(State(state): State<AppState>) -> Json<DiagnosticReport> {
    Json(state.probe.check_api_key_permissions().await)
}
