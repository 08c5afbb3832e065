use super::{NO_STORE, SYSTEM_TAG};
use axum::http::header;
use axum::{Json, response::IntoResponse};
use helm_derive::{api_handler, api_model};
use std::sync::LazyLock;
use std::time::Instant;

/// Liveness report.
#[api_model]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the process started serving.
    pub uptime: u64,
}

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: STARTED.elapsed().as_secs(),
    };

    ([(header::CACHE_CONTROL, NO_STORE)], Json(body))
}
