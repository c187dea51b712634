use crate::{AppState, handlers};
use axum::Router;

/// Page Router Module
///
/// Every path the edge does not serve itself belongs to the page renderer. There is
/// deliberately no route table here: pages are owned by the renderer, and the edge
/// forwards method, path, query, headers and body unchanged.
pub fn page_routes() -> Router<AppState> {
    Router::new().fallback(handlers::render_page)
}
