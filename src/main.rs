use reportdesk::{
    config::Config,
    routes,
    state::AppState,
    utils::{auth::AuthGate, inference::HuggingFaceProvider, report::ReportEngine},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 0. Load .env file immediately
    // Silently ignores a missing .env; real deployments set the vars directly.
    dotenvy::dotenv().ok();

    // 1. Initialize Sentry (if configured)
    // This guard must be kept in scope for Sentry to work
    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            ..Default::default()
        },
    ));

    // 2. Install rustls crypto provider
    // Has to happen before the first outbound HTTPS call to the inference endpoint.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // 3. Initialize logging
    // Respects RUST_LOG, defaults to debug for us and tower_http.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reportdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    tracing::info!("Starting report desk...");

    // 4. Load and validate configuration
    // Missing JWT_SECRET, AUTH_USERNAME, AUTH_PASSWORD or HF_TOKEN stops us here.
    let config = Config::from_env().inspect_err(|e| tracing::error!("{}", e))?;
    tracing::debug!("Loaded configuration: {:?}", config);

    // 5. Build the app state
    // Constructed once, cloned into every handler. Nothing in here is mutable.
    let provider = HuggingFaceProvider::new(&config.inference)?;
    let state = AppState {
        auth: Arc::new(AuthGate::new(&config.auth)?),
        reports: Arc::new(ReportEngine::new(
            Arc::new(provider),
            config.inference.max_tokens,
        )),
    };
    let app = routes::create_routes(state, config.cors_origin.clone());

    // 6. Start the server
    // 0.0.0.0 so it binds to all interfaces (necessary in Docker).
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
