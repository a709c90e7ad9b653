use crate::error::AppError;
use crate::models::user::{LoginRequest, TokenResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;

/// `POST /login`: trade the configured username/password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<TokenResponse>, AppError> {
    match state.auth.login(&payload.username, &payload.password) {
        Ok(access_token) => {
            tracing::info!("Issued token for {}", payload.username);
            Ok(Json(TokenResponse { access_token }))
        }
        Err(e) => {
            // Never log the password, even a wrong one.
            tracing::warn!("Login failed for {:?}: {}", payload.username, e);
            Err(e)
        }
    }
}
