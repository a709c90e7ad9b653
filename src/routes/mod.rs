use crate::handlers::{auth::login, chat::chat, health::health_check};
use crate::state::AppState;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds the full router.
///
/// `cors_origin` pins CORS to one front-end origin (e.g. the React dev server
/// on `http://localhost:3000`). `None` allows any origin. Config validates the
/// origin, so there is no failure path here.
pub fn create_routes(state: AppState, cors_origin: Option<HeaderValue>) -> Router {
    let allow_origin = match cors_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/chat", post(chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
