use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, StatusCode, Uri, uri::PathAndQuery},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod renderer;

// Routes split by who answers them (edge vs. page renderer).
pub mod routes;
use routes::{pages, public};

use models::AuthState;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use guard::{decide, normalize_path};
pub use models::Decision;
pub use renderer::{HttpRenderer, MockRenderer, RendererState};

/// ApiDoc
///
/// OpenAPI document for the endpoints the edge serves itself. Pages forwarded to the
/// renderer are not part of it. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::get_access_decision),
    components(
        schemas(
            models::Role, models::Decision, models::QueryParam, models::AccessReport,
        )
    ),
    tags(
        (name = "pitch-gate", description = "Storefront & booking edge: route access guard")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable state handed to every request: the configuration and the page
/// renderer the edge forwards to.
#[derive(Clone)]
pub struct AppState {
    /// Page rendering collaborator (HTTP upstream or mock).
    pub renderer: RendererState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RendererState {
    fn from_ref(app_state: &AppState) -> RendererState {
        app_state.renderer.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_guard
///
/// Edge middleware that runs in front of every request.
///
/// *Mechanism*: the path is normalized and checked against the matcher set. Paths
/// outside it pass straight through. Paths inside it are run through `guard::decide`
/// with the `AuthState` read from the cookies; `Allow` continues to the next handler,
/// any redirect answers `307 Temporary Redirect` and the page is never rendered.
/// Requests that continue carry the normalized path, so the renderer serves exactly the
/// page the guard judged.
///
/// The guard is a UX shortcut only. A present token is never validated here, and the
/// role cookie never grants anything: the backend authorizes each privileged call.
async fn access_guard(
    State(config): State<AppConfig>,
    auth: AuthState,
    mut request: Request,
    next: Next,
) -> Response {
    let path = guard::normalize_path(request.uri().path());
    if path != request.uri().path() {
        match canonical_uri(request.uri(), &path) {
            Some(uri) => *request.uri_mut() = uri,
            None => {
                tracing::warn!(uri = %request.uri(), "could not rewrite request path");
                return StatusCode::BAD_REQUEST.into_response();
            }
        }
    }

    if !config.matcher.matches(&path) {
        return next.run(request).await;
    }

    let decision = guard::decide(&path, &auth, &config.paths);
    match decision.location() {
        None => {
            tracing::debug!(%path, has_token = auth.has_token, "access allowed");
            next.run(request).await
        }
        Some(location) => {
            tracing::info!(
                %path,
                has_token = auth.has_token,
                role = ?auth.role,
                %location,
                "access redirected"
            );
            Redirect::temporary(&location).into_response()
        }
    }
}

/// canonical_uri
///
/// `uri` with its path replaced by `path`; scheme, authority and query are kept.
fn canonical_uri(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// create_router
///
/// Assembles the edge's routing structure, the access guard and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Everything else is a page and goes to the renderer.
        .merge(pages::page_routes())
        // The guard wraps the whole router, fallback included; the matcher decides
        // which paths it actually acts on.
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request tracing span, tagged with method, URI and the request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
