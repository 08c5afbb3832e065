use crate::SETTINGS_TAG;
use crate::error::SettingsError;
use crate::model::{ConfigResponse, ConfigUpdate, DeleteResponse, LayoutDocument};
use crate::patch::ConfigPatch;
use crate::store::ConfigStore;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use helm_derive::api_handler;
use helm_domain::dashboard::import_layout;
use helm_kernel::server::{ErrorResponse, NO_STORE};
use serde::Serialize;
use tower_cookies::Cookies;

fn no_store<T: Serialize>(body: T) -> Response {
    ([(header::CACHE_CONTROL, NO_STORE)], Json(body)).into_response()
}

async fn update(store: &ConfigStore, cookies: &Cookies, body: &[u8]) -> Result<Response, SettingsError> {
    let patch = ConfigPatch::from_json(body)?;
    let config = store.write(cookies, patch).await?;
    Ok(no_store(ConfigResponse::from(config)))
}

#[api_handler(
    get,
    path = "/config",
    responses((status = OK, description = "Current configuration", body = ConfigResponse)),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn get_config(State(store): State<ConfigStore>, cookies: Cookies) -> Response {
    no_store(ConfigResponse::from(store.read(&cookies).await))
}

#[api_handler(
    put,
    path = "/config",
    request_body(content = ConfigUpdate, content_type = "application/json"),
    responses(
        (status = OK, description = "Merged and saved configuration", body = ConfigResponse),
        (status = BAD_REQUEST, description = "Malformed patch", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Configuration could not be saved", body = ErrorResponse),
    ),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn put_config(
    State(store): State<ConfigStore>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response, SettingsError> {
    update(&store, &cookies, &body).await
}

/// Same as `PUT`. Browsers can only `POST` from `navigator.sendBeacon` on page unload, and
/// the beacon may carry any content type.
#[api_handler(
    post,
    path = "/config",
    request_body(content = ConfigUpdate, content_type = "application/json"),
    responses(
        (status = OK, description = "Merged and saved configuration", body = ConfigResponse),
        (status = BAD_REQUEST, description = "Malformed patch", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Configuration could not be saved", body = ErrorResponse),
    ),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn post_config(
    State(store): State<ConfigStore>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response, SettingsError> {
    update(&store, &cookies, &body).await
}

#[api_handler(
    delete,
    path = "/config",
    responses(
        (status = OK, description = "Stored configuration removed, or there was none", body = DeleteResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Configuration could not be removed", body = ErrorResponse),
    ),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn delete_config(State(store): State<ConfigStore>, cookies: Cookies) -> Result<Response, SettingsError> {
    store.delete(&cookies).await?;
    Ok(no_store(DeleteResponse { ok: true }))
}

#[api_handler(
    get,
    path = "/config/layout",
    responses((status = OK, description = "Layout export document", body = LayoutDocument)),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn get_layout(State(store): State<ConfigStore>, cookies: Cookies) -> Response {
    no_store(LayoutDocument::new(store.read(&cookies).await.layout))
}

#[api_handler(
    put,
    path = "/config/layout",
    request_body(content = LayoutDocument, description = "Export document, or a bare layout array"),
    responses(
        (status = OK, description = "Layout replaced", body = ConfigResponse),
        (status = BAD_REQUEST, description = "Not a layout document", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Configuration could not be saved", body = ErrorResponse),
    ),
    tag = SETTINGS_TAG,
)]
pub(crate) async fn put_layout(
    State(store): State<ConfigStore>,
    cookies: Cookies,
    body: Bytes,
) -> Result<Response, SettingsError> {
    let document = serde_json::from_slice(&body)
        .map_err(|e| SettingsError::validation(format!("Body is not valid JSON: {e}")))?;
    let layout = import_layout(document)
        .ok_or_else(|| SettingsError::validation("layout must be an array or a version 1 layout document"))?;

    let config = store.set_layout(&cookies, layout).await?;
    Ok(no_store(ConfigResponse::from(config)))
}
