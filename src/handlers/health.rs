use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// Liveness check for load balancers.
///
/// Never calls the inference provider; every check would be a billed request.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "ok".to_string(),
        model: state.reports.model().to_string(),
    };

    (StatusCode::OK, Json(response))
}
