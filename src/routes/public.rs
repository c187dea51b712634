use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints served directly by the edge. None of them fall inside the guard's
/// matcher set, so they are reachable with or without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(handlers::health))
        // GET /edge/access?path=...
        // Access preview for client-side navigation. Evaluates the matcher and the
        // guard against the caller's cookies without rendering anything.
        .route("/edge/access", get(handlers::get_access_decision))
}
