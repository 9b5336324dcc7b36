//! HTTP error mapping for the web UI.

use crate::error::ConnoisseurError;
use crate::web::pages;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Errors a handler can end with. Input problems are not here: those re-render the form.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// A hosted service or local IO failed during generation (502)
    #[error(transparent)]
    Pipeline(#[from] ConnoisseurError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Pipeline(ref err) = self {
            error!(error = %err, "Report generation failed");
        }
        (status, Html(pages::render_error(status, &self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound("report".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("form".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ConnoisseurError::GatewayError("429".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_pipeline_error_message_is_transparent() {
        let err = ApiError::from(ConnoisseurError::ApiError("rate limit exceeded".into()));
        assert_eq!(err.to_string(), "API error: rate limit exceeded");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::NotFound("No report yet".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
