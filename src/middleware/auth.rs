use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

/// Represents an authenticated user extracted from the JWT.
///
/// Add `user: AuthenticatedUser` to a handler and Axum will:
/// 1. Pull the `Authorization: Bearer <token>` header
/// 2. Verify signature and expiry through the `AuthGate`
/// 3. Hand over the username, or answer 401 before the handler runs
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Missing header, other schemes, and unparseable values are all
        // "no bearer token" as far as the client is concerned.
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::MissingToken)?;

        let username = state.auth.verify(bearer.token()).inspect_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
        })?;

        Ok(AuthenticatedUser { username })
    }
}
