use async_trait::async_trait;
use axum::{
    body::{self, Body},
    extract::Request,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::Response,
};
use std::sync::{Arc, Mutex};

use crate::{config::AppConfig, error::AppError};

// 1. PageRenderer Contract
/// PageRenderer
///
/// The page-rendering collaborator that sits behind the edge. Every request the
/// guard lets through is handed over unchanged; whatever the renderer answers goes back
/// to the client. Swapping the implementation (HTTP upstream in production, mock in
/// tests) leaves the guard and routing untouched.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, request: Request) -> Result<Response, AppError>;
}

// Connection-scoped headers that must not be forwarded in either direction.
const HOP_BY_HOP: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove(header::UPGRADE);
}

// 2. The Real Implementation (HTTP upstream)
/// HttpRenderer
///
/// Forwards requests to the renderer's base URL with reqwest. Redirects issued by the
/// renderer are returned to the client as-is rather than followed.
#[derive(Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
    base_url: String,
    max_body_bytes: usize,
}

impl HttpRenderer {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.renderer_timeout)
            .build()
            .map_err(AppError::Client)?;

        Ok(Self {
            client,
            base_url: config.renderer_url.trim_end_matches('/').to_string(),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, request: Request) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        let url = format!("{}{}", self.base_url, path_and_query);

        let body = body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| AppError::from_body_error(e, self.max_body_bytes))?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        // reqwest derives Host and Content-Length from the URL and buffered body.
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        tracing::debug!(method = %parts.method, %url, "forwarding to page renderer");

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);
        // The body is re-framed by hyper.
        response_headers.remove(header::CONTENT_LENGTH);

        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockRenderer
///
/// Answers every request with `200 OK` and a body naming the rendered path and query,
/// and records the paths it saw. Lets tests assert whether a request got past the guard
/// without a running renderer.
#[derive(Clone, Default)]
pub struct MockRenderer {
    /// When true, every render fails with `AppError::RendererUnavailable`.
    pub should_fail: bool,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Paths (with query) rendered so far, in arrival order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageRenderer for MockRenderer {
    async fn render(&self, request: Request) -> Result<Response, AppError> {
        if self.should_fail {
            return Err(AppError::RendererUnavailable(
                "Mock Renderer Error: Simulation requested".to_string(),
            ));
        }

        let target = request
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str())
            .to_string();

        if let Ok(mut rendered) = self.rendered.lock() {
            rendered.push(target.clone());
        }

        let mut response = Response::new(Body::from(format!("rendered {target}")));
        *response.status_mut() = StatusCode::OK;
        Ok(response)
    }
}

/// RendererState
///
/// The concrete type used to share the renderer across the application state.
pub type RendererState = Arc<dyn PageRenderer>;
