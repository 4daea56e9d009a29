//! Errors surfaced by the HTTP layer.
//!
//! Resolution degrades to nulls rather than failing, so only two outcomes
//! reach a client as errors: a strict-mode miss and a response that could not
//! be rendered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ensapi_core::error::EnsApiError;
use serde::Serialize;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Nothing resolved for the query while strict not-found is on.
    NotFound(String),
    /// Upstream detail is logged, never echoed.
    Internal,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: Body<'a>,
}

#[derive(Serialize)]
struct Body<'a> {
    code: &'static str,
    message: &'a str,
}

impl ApiError {
    /// Strict-mode miss.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::NotFound(message) => message,
            Self::Internal => "An internal error occurred",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            error: Body {
                code: self.code(),
                message: self.message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<EnsApiError> for ApiError {
    fn from(err: EnsApiError) -> Self {
        tracing::error!(error = %err, "Failed to render response");
        Self::Internal
    }
}
