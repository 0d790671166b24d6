//! Access-token lookup and the session cookie.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use shared::entity::users;
use time::Duration;

use crate::state::AppState;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Where a request carried its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Header,
}

/// Cookie first (browsers), then `Authorization: Bearer` (API clients).
pub fn token_from_request(jar: &CookieJar, headers: &HeaderMap) -> Option<(String, TokenSource)> {
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some((cookie.value().to_string(), TokenSource::Cookie));
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
        .map(|token| (token, TokenSource::Header))
}

/// The active user a token belongs to, or `None` for anything unverifiable.
pub async fn resolve_user(state: &AppState, token: &str, source: TokenSource) -> Option<users::Model> {
    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Token from {:?} rejected: {:#}", source, e);
            return None;
        }
    };
    match state.user_service.get_user_by_username(&claims.sub).await {
        Ok(Some(user)) if user.is_active => Some(user),
        Ok(Some(user)) => {
            tracing::warn!("User is not active: {}", user.username);
            None
        }
        Ok(None) => {
            tracing::warn!("Token names unknown user: {}", claims.sub);
            None
        }
        Err(e) => {
            tracing::error!("User lookup failed during authentication: {}", e);
            None
        }
    }
}

pub fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.tokens.lifetime_secs()))
        .build()
}

pub fn cleared_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build()
}
