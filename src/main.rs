use pitch_gate::{
    AppState, HttpRenderer, RendererState,
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, the page renderer client and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production settings)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pitch_gate=debug,tower_http=info,axum=trace".into());

    // 3. Log format by environment
    match config.env {
        Env::Local => {
            // LOCAL: human-readable output.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Edge starting in {:?} mode", config.env);
    tracing::info!(
        matcher = ?config.matcher.roots(),
        token_cookie = %config.token_cookie,
        role_cookie = %config.role_cookie,
        "Access guard configured"
    );

    // 4. Page Renderer Client
    let renderer = HttpRenderer::new(&config)
        .expect("FATAL: Failed to build the page renderer HTTP client.");
    tracing::info!("Forwarding pages to {}", renderer.base_url());
    let renderer = Arc::new(renderer) as RendererState;

    // 5. Unified State Assembly
    let listen_addr = config.listen_addr.clone();
    let app_state = AppState { renderer, config };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .expect("FATAL: Failed to bind LISTEN_ADDR.");

    tracing::info!("Listening on {}", listen_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
