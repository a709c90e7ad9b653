use crate::error::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;

/// `POST /chat`: forward the message to the report engine.
///
/// The extractor has already verified the token by the time we get here.
/// `AuthenticatedUser` goes before `Json` so a bad token is rejected before
/// the body is even read.
pub async fn chat(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<ChatRequest>, AppError>,
) -> Result<Json<ChatResponse>, AppError> {
    tracing::debug!(
        "Chat request from {} ({} chars)",
        user.username,
        payload.message.len()
    );

    let reply = state.reports.generate(&payload.message).await?;

    tracing::debug!("Reply for {} ({} chars)", user.username, reply.len());
    Ok(Json(ChatResponse { reply }))
}
