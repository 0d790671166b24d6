//! Shared helpers: a migrated in-memory database behind the real router.

#![allow(dead_code)]

use api::{build_app, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use shared::{get_db_connection, Config};
use tower::ServiceExt;

pub fn test_config(max_strategies_per_user: u64) -> Config {
    Config {
        app_name: "Strategy Builder".to_string(),
        app_env: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        secret_key: "integration-test-secret".to_string(),
        access_token_expire_minutes: 30,
        host: "127.0.0.1".to_string(),
        port: 0,
        secure_cookies: false,
        allowed_origins: Vec::new(),
        static_dir: "static".to_string(),
        max_strategies_per_user,
        log_json: false,
    }
}

pub async fn test_app_with_limit(max_strategies_per_user: u64) -> Router {
    let config = test_config(max_strategies_per_user);
    let db = get_db_connection(&config.database_url).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    build_app(AppState::with_db(config, db))
}

pub async fn test_app() -> Router {
    test_app_with_limit(50).await
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

pub fn form_post(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn json_post(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn page_get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header(header::ACCEPT, "text/html");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header(header::ACCEPT, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers `username` and returns the `access_token=...` cookie pair.
pub async fn register(app: &Router, username: &str) -> String {
    let body = format!("username={0}&email={0}%40example.com&password=secret123", username);
    let response = send(app, form_post("/auth/register", None, &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

pub fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub fn rsi_strategy(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "description": "Buy when RSI is oversold",
        "indicator": "RSI",
        "operator": "<",
        "value": 30.0,
        "stop_loss": 2.0,
        "target": 5.0,
        "capital": 100000.0
    })
}

/// Creates a strategy over the JSON API and returns its id.
pub async fn create_strategy(app: &Router, cookie: &str, name: &str) -> i64 {
    let response = send(app, json_post("/api/strategies", Some(cookie), rsi_strategy(name))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["strategy"]["id"].as_i64().unwrap()
}
