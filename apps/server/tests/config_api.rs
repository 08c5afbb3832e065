use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use helm_domain::config::{ApiConfig, Backend};
use helm_domain::constants::COOKIE_NAME;
use helm_server::Server;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;
use tower_cookies::Cookie;
use tower_cookies::cookie::SameSite;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl Reply {
    fn set_cookie(&self) -> Cookie<'static> {
        let raw = self.headers.get(header::SET_COOKIE).expect("set-cookie header").to_str().unwrap();
        Cookie::parse_encoded(raw.to_owned()).unwrap()
    }

    /// `name=value` pair to send back, exactly as the server encoded it.
    fn cookie_pair(&self) -> String {
        let raw = self.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        raw.split(';').next().unwrap().to_owned()
    }
}

async fn app(dir: &Path, backend: Backend, secret: Option<&str>) -> Router {
    let mut cfg = ApiConfig::default();
    cfg.storage.data_dir = dir.to_path_buf();
    cfg.persistence.backend = backend;
    cfg.security.secret = secret.map(str::to_owned);

    Server::builder().config(cfg).build().await.unwrap().into_router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>, cookie: Option<&str>) -> Reply {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = request.body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned()))).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };

    Reply { status, headers, body }
}

fn assert_no_store(reply: &Reply) {
    assert_eq!(reply.headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}

#[tokio::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    let reply = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "up");
    assert_no_store(&reply);
}

#[tokio::test]
async fn test_api_reference_is_served() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    let request = Request::builder().uri("/api").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&html);
    assert!(html.contains("/config/layout"));
}

#[tokio::test]
async fn test_file_backend_end_to_end() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, Some("operator-secret")).await;

    let reply = send(&app, Method::PUT, "/config", Some(r#"{"gateway":{"url":"ws://h:1","token":"abc"}}"#), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["gateway"]["hasToken"], true);
    assert_no_store(&reply);

    let reply = send(&app, Method::GET, "/config", None, None).await;
    assert_eq!(reply.body["gateway"], json!({ "url": "ws://h:1", "token": "abc", "hasToken": true }));
    assert_eq!(reply.body["layout"], json!([]));
    assert_eq!(reply.body["editMode"], false);
    assert_no_store(&reply);

    let stored = std::fs::read_to_string(dir.path().join("helm-config.json")).unwrap();
    assert!(!stored.contains("\"abc\""));
}

#[tokio::test]
async fn test_defaults_before_first_write() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    let reply = send(&app, Method::GET, "/config", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["gateway"], json!({ "url": "ws://localhost:18789", "token": "", "hasToken": false }));
}

#[tokio::test]
async fn test_validation_errors_name_the_field() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    for (body, field) in [
        (r#"{"editMode":"yes"}"#, "editMode"),
        (r#"{"layout":{}}"#, "layout"),
        (r#"{"gateway":{"url":5}}"#, "gateway.url"),
        ("not json", "JSON"),
    ] {
        let reply = send(&app, Method::PUT, "/config", Some(body), None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(reply.body["error"].as_str().unwrap().contains(field), "{body}: {}", reply.body);
        assert_no_store(&reply);
    }

    assert!(!dir.path().join("helm-config.json").exists());
}

#[tokio::test]
async fn test_post_is_an_alias_for_any_content_type() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/config")
        .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
        .body(Body::from(r#"{"editMode":true}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply = send(&app, Method::GET, "/config", None, None).await;
    assert_eq!(reply.body["editMode"], true);
}

#[tokio::test]
async fn test_patches_merge_shallowly() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    send(&app, Method::PUT, "/config", Some(r#"{"gateway":{"url":"ws://h:1","token":"abc"},"editMode":true}"#), None).await;
    let reply = send(&app, Method::PUT, "/config", Some(r#"{"layout":[{"i":"a"}]}"#), None).await;

    assert_eq!(reply.body["gateway"]["token"], "abc");
    assert_eq!(reply.body["editMode"], true);
    assert_eq!(reply.body["layout"], json!([{ "i": "a" }]));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    send(&app, Method::PUT, "/config", Some(r#"{"editMode":true}"#), None).await;

    for _ in 0..2 {
        let reply = send(&app, Method::DELETE, "/config", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!({ "ok": true }));
    }

    let reply = send(&app, Method::GET, "/config", None, None).await;
    assert_eq!(reply.body["editMode"], false);
}

#[tokio::test]
async fn test_layout_export_and_import() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::File, None).await;

    let document = r#"{"version":1,"layout":[{"i":"a","x":0},{"i":"b","x":4}]}"#;
    let reply = send(&app, Method::PUT, "/config/layout", Some(document), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["layout"].as_array().unwrap().len(), 2);

    let reply = send(&app, Method::GET, "/config/layout", None, None).await;
    assert_eq!(reply.body, json!({ "version": 1, "layout": [{ "i": "a", "x": 0 }, { "i": "b", "x": 4 }] }));
    assert_no_store(&reply);

    let reply = send(&app, Method::PUT, "/config/layout", Some(r#"[{"i":"c"}]"#), None).await;
    assert_eq!(reply.body["layout"], json!([{ "i": "c" }]));

    for body in [r#"{"version":2,"layout":[]}"#, r#"{"layout":"x"}"#, "42"] {
        let reply = send(&app, Method::PUT, "/config/layout", Some(body), None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn test_cookie_backend_end_to_end() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::Cookie, Some("operator-secret")).await;

    let reply = send(&app, Method::PUT, "/config", Some(r#"{"gateway":{"url":"ws://h:1","token":"abc"}}"#), None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let cookie = reply.set_cookie();
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert!(cookie.value().starts_with("e:"));
    assert!(!cookie.value().contains("abc\""));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    assert_eq!(cookie.path(), Some("/"));
    assert!(cookie.max_age().is_some());

    let pair = reply.cookie_pair();
    let reply = send(&app, Method::GET, "/config", None, Some(&pair)).await;
    assert_eq!(reply.body["gateway"]["token"], "abc");
    assert_eq!(reply.body["gateway"]["hasToken"], true);

    let reply = send(&app, Method::GET, "/config", None, None).await;
    assert_eq!(reply.body["gateway"]["hasToken"], false);

    assert!(!dir.path().join("helm-config.json").exists());
}

#[tokio::test]
async fn test_cookie_patches_build_on_request_cookie() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::Cookie, Some("operator-secret")).await;

    let first = send(&app, Method::PUT, "/config", Some(r#"{"gateway":{"url":"ws://h:1","token":"abc"}}"#), None).await;
    let reply = send(&app, Method::PUT, "/config", Some(r#"{"editMode":true}"#), Some(&first.cookie_pair())).await;

    assert_eq!(reply.body["gateway"]["token"], "abc");
    assert_eq!(reply.body["editMode"], true);
}

#[tokio::test]
async fn test_tampered_cookie_reads_as_defaults() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::Cookie, Some("operator-secret")).await;

    let cookie = format!("{COOKIE_NAME}=e:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
    let reply = send(&app, Method::GET, "/config", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["gateway"]["hasToken"], false);
}

#[tokio::test]
async fn test_cookie_delete_expires_cookie() {
    let dir = tempdir().unwrap();
    let app = app(dir.path(), Backend::Cookie, Some("operator-secret")).await;

    let first = send(&app, Method::PUT, "/config", Some(r#"{"editMode":true}"#), None).await;
    let reply = send(&app, Method::DELETE, "/config", None, Some(&first.cookie_pair())).await;

    assert_eq!(reply.body, json!({ "ok": true }));
    let removal = reply.set_cookie();
    assert_eq!(removal.name(), COOKIE_NAME);
    assert_eq!(removal.value(), "");
}
