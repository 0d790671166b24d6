//! Registration, login, logout and token handling through the router.

mod common;

use axum::http::{header, Request, StatusCode};
use axum::body::Body;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let app = test_app().await;
    let body = "username=alice&email=alice%40example.com&password=secret123";
    let response = send(&app, form_post("/auth/register", None, body)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=1800"));

    let cookie = session_cookie(&response);
    let dashboard = send(&app, page_get("/dashboard", Some(&cookie))).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(body_text(dashboard).await.contains("alice"));
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let app = test_app().await;
    register(&app, "bob").await;

    let body = "username=bob&email=other%40example.com&password=secret123";
    let response = send(&app, form_post("/auth/register", None, body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Username already registered"));
}

#[tokio::test]
async fn test_invalid_registration_lists_every_error() {
    let app = test_app().await;
    let response = send(&app, form_post("/auth/register", None, "username=x&email=nope&password=1")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await;
    assert!(html.contains("Username must be 3-50"));
    assert!(html.contains("Please enter a valid email address"));
    assert!(html.contains("Password must be at least 6 characters"));
}

#[tokio::test]
async fn test_login_and_wrong_password() {
    let app = test_app().await;
    register(&app, "carol").await;

    let response = send(&app, form_post("/auth/login", None, "username=carol&password=wrong")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("Incorrect username or password"));

    let response = send(&app, form_post("/auth/login", None, "username=carol&password=secret123")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
    let cookie = session_cookie(&response);

    let me = send(&app, json_get("/api/me", Some(&cookie))).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = body_json(me).await;
    assert_eq!(me["username"], "carol");
    assert_eq!(me["email"], "carol@example.com");
    assert!(me["last_login"].is_string());
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_page_redirects_when_signed_in() {
    let app = test_app().await;
    let cookie = register(&app, "dave").await;
    let response = send(&app, page_get("/auth/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = test_app().await;
    let cookie = register(&app, "erin").await;
    let response = send(&app, form_post("/auth/logout", Some(&cookie), "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_anonymous_browser_is_sent_to_login() {
    let app = test_app().await;
    for uri in ["/dashboard", "/builder", "/strategy/1"] {
        let response = send(&app, page_get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/auth/login");
    }
}

#[tokio::test]
async fn test_anonymous_api_call_is_401() {
    let app = test_app().await;
    let response = send(&app, json_get("/api/strategies", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");

    let response = send(&app, json_get("/strategy/1", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_cookie_is_anonymous() {
    let app = test_app().await;
    let response = send(&app, page_get("/dashboard", Some("access_token=not-a-jwt"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_bearer_token_flow() {
    let app = test_app().await;
    register(&app, "frank").await;

    let response = send(
        &app,
        json_post("/api/auth/token", None, json!({ "username": "frank", "password": "secret123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);
    let token = body["access_token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "frank");

    let response = send(
        &app,
        json_post("/api/auth/token", None, json!({ "username": "frank", "password": "nope" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
