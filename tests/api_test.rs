//! End-to-end tests of the HTTP surface with the inference provider mocked out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderValue, Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use reportdesk::config::AuthConfig;
use reportdesk::error::AppError;
use reportdesk::routes::create_routes;
use reportdesk::state::AppState;
use reportdesk::utils::auth::AuthGate;
use reportdesk::utils::inference::{CompletionRequest, Provider};
use reportdesk::utils::report::ReportEngine;

const SECRET: &str = "integration-secret";

struct StubProvider {
    reply: Result<&'static str, &'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl Provider for StubProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.messages.len(), 2);
        self.reply
            .map(|r| r.to_string())
            .map_err(|e| AppError::Service(e.to_string()))
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

fn app_with(reply: Result<&'static str, &'static str>) -> (Router, Arc<StubProvider>) {
    build(reply, None)
}

fn build(
    reply: Result<&'static str, &'static str>,
    cors_origin: Option<HeaderValue>,
) -> (Router, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider {
        reply,
        calls: AtomicUsize::new(0),
    });
    let auth = AuthConfig {
        username: "user".to_string(),
        password: "pwd".to_string(),
        jwt_secret: SECRET.to_string(),
        token_ttl_secs: 3600,
    };
    let state = AppState {
        auth: Arc::new(AuthGate::new(&auth).unwrap()),
        reports: Arc::new(ReportEngine::new(provider.clone(), 300)),
    };
    (create_routes(state, cors_origin), provider)
}

fn app() -> Router {
    app_with(Ok("Apple Inc. (AAPL) reported steady revenue growth.")).0
}

fn json_post(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_post(
            "/login",
            json!({"username": "user", "password": "pwd"}),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn login_with_valid_credentials_returns_token() {
    let app = app();
    let token = login(&app).await;
    assert_eq!(token.split('.').count(), 3);
}

#[tokio::test]
async fn login_with_bad_credentials_is_400() {
    let response = app()
        .oneshot(json_post(
            "/login",
            json!({"username": "user", "password": "wrong"}),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"detail": "Invalid credentials"}));
}

#[tokio::test]
async fn chat_with_token_returns_reply() {
    let app = app();
    let token = login(&app).await;

    let response = app
        .oneshot(json_post("/chat", json!({"message": "AAPL"}), Some(token.as_str())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let reply = body["reply"].as_str().unwrap();
    assert!(!reply.is_empty());
    assert!(reply.starts_with("Apple Inc."));
}

#[tokio::test]
async fn chat_without_token_is_401_and_skips_provider() {
    let (app, provider) = app_with(Ok("unused"));

    let response = app
        .oneshot(json_post("/chat", json!({"message": "AAPL"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    assert_eq!(body_json(response).await["detail"], "Missing bearer token");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chat_with_non_bearer_scheme_is_401() {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwd2Q=")
        .body(Body::from(json!({"message": "AAPL"}).to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_with_garbage_token_is_401() {
    let response = app()
        .oneshot(json_post("/chat", json!({"message": "AAPL"}), Some("abc.def.ghi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Invalid token");
}

#[tokio::test]
async fn chat_with_expired_token_is_401() {
    let claims = json!({"sub": "user", "exp": chrono::Utc::now().timestamp() - 60});
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let response = app()
        .oneshot(json_post("/chat", json!({"message": "AAPL"}), Some(token.as_str())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Token has expired");
}

#[tokio::test]
async fn provider_failure_is_502() {
    let (app, provider) = app_with(Err("endpoint returned 503 Service Unavailable"));
    let token = login(&app).await;

    let response = app
        .oneshot(json_post("/chat", json!({"message": "AAPL"}), Some(token.as_str())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await["detail"],
        "Inference service error: endpoint returned 503 Service Unavailable"
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_reports_model() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "model": "stub-model"})
    );
}

fn raw_post(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn malformed_login_body_gets_json_detail() {
    let response = app()
        .oneshot(raw_post("/login", Some("application/json"), "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn incomplete_login_body_gets_json_detail() {
    let response = app()
        .oneshot(raw_post(
            "/login",
            Some("application/json"),
            r#"{"username": "user"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("password"), "unexpected detail: {}", detail);
}

#[tokio::test]
async fn login_without_content_type_gets_json_detail() {
    let response = app()
        .oneshot(raw_post(
            "/login",
            None,
            r#"{"username": "user", "password": "pwd"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn chat_with_token_but_bad_body_gets_json_detail() {
    let (app, provider) = app_with(Ok("unused"));
    let token = login(&app).await;

    let response = app
        .oneshot(json_post("/chat", json!({"text": "AAPL"}), Some(token.as_str())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["detail"].is_string());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/chat")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_is_pinned_to_configured_origin() {
    let (app, _) = build(
        Ok("unused"),
        Some(HeaderValue::from_static("http://localhost:3000")),
    );

    let response = app
        .clone()
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );

    let response = app.oneshot(preflight("http://evil.example")).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn cors_allows_any_origin_when_unpinned() {
    let response = app()
        .oneshot(preflight("http://anywhere.example"))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
