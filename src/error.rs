use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use thiserror::Error;

/// AppError
///
/// Failures of the edge service itself. The access guard has none; these come from
/// talking to the page renderer.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Page renderer request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Request body could not be read: {0}")]
    RequestBody(axum::Error),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Page renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Page renderer client could not be built: {0}")]
    Client(reqwest::Error),
}

impl AppError {
    /// from_body_error
    ///
    /// Classifies a failure of buffering the request body: hitting `limit` is the
    /// client's oversized payload, anything else an unreadable body.
    pub fn from_body_error(error: axum::Error, limit: usize) -> Self {
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&error);
        while let Some(current) = source {
            if current.is::<LengthLimitError>() {
                return AppError::PayloadTooLarge { limit };
            }
            source = current.source();
        }
        AppError::RequestBody(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::RequestBody(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream(_) | AppError::RendererUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(%status, error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}
