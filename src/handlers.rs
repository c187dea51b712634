use crate::{
    AppState,
    error::AppError,
    guard,
    models::{AccessQuery, AccessReport, AuthState, Decision},
};
use axum::{
    Json,
    extract::{Query, Request, State},
    response::Response,
};

/// health
///
/// [Public Route] Liveness probe for load balancers. Never guarded.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Edge is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_access_decision
///
/// [Public Route] Previews what the edge would do with a navigation to `path`, using
/// the caller's own cookies. Client-side transitions call this so they reach the same
/// verdict a full page load would get from the middleware.
///
/// Paths outside the matcher set report `guarded = false` and `Allow`, exactly like a
/// real request that never reaches the guard.
#[utoipa::path(
    get,
    path = "/edge/access",
    params(AccessQuery),
    responses((status = 200, description = "Access decision", body = AccessReport))
)]
pub async fn get_access_decision(
    auth: AuthState,
    State(state): State<AppState>,
    Query(query): Query<AccessQuery>,
) -> Json<AccessReport> {
    let config = &state.config;
    let path = guard::normalize_path(&query.path);
    let guarded = config.matcher.matches(&path);

    let decision = if guarded {
        guard::decide(&path, &auth, &config.paths)
    } else {
        Decision::Allow
    };

    Json(AccessReport {
        location: decision.location(),
        path,
        guarded,
        authenticated: auth.has_token,
        role: auth.role,
        decision,
    })
}

/// render_page
///
/// [Fallback Route] Hands every request not served by the edge itself to the page
/// renderer. Reached only after `access_guard` has allowed the request.
pub async fn render_page(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    state.renderer.render(request).await
}
