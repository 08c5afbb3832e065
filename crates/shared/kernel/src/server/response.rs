use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use helm_derive::api_model;

/// `Cache-Control` value for responses that may carry secrets.
pub const NO_STORE: &str = "no-store";

/// Body of every non-2xx JSON response.
#[api_model]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }

    /// Pairs the body with a status, uncached.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, [(header::CACHE_CONTROL, NO_STORE)], Json(self)).into_response()
    }
}
