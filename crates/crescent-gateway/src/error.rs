// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from `CrescentError` to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crescent_core::CrescentError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

/// A handler failure, rendered as a JSON error body.
///
/// NotFound and Validation carry their message to the client. Anything
/// else is logged and reported as a generic 500.
#[derive(Debug)]
pub struct ApiError(pub CrescentError);

impl From<CrescentError> for ApiError {
    fn from(e: CrescentError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CrescentError::NotFound { .. } => StatusCode::NOT_FOUND,
            CrescentError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            ErrorResponse::new("internal storage error")
        } else {
            ErrorResponse::new(self.0.to_string())
        };
        (status, Json(body)).into_response()
    }
}
