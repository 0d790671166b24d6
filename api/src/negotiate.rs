//! Browser-or-API detection, plus extractors whose rejections answer in the
//! caller's format: a body extractor that accepts both forms and JSON, and
//! path and query wrappers.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header, request::Parts, HeaderMap},
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::error::{AppError, PageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Browser,
    Api,
}

impl ClientKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let has_json = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.contains("application/json"))
                .unwrap_or(false)
        };
        let xhr = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        if has_json(header::CONTENT_TYPE) || has_json(header::ACCEPT) || xhr {
            ClientKind::Api
        } else {
            ClientKind::Browser
        }
    }

    /// Anything under `/api/` is an API call whatever its headers say.
    pub fn for_request(path: &str, headers: &HeaderMap) -> Self {
        if path.starts_with("/api/") {
            ClientKind::Api
        } else {
            ClientKind::from_headers(headers)
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, ClientKind::Api)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientKind {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientKind::for_request(parts.uri.path(), &parts.headers))
    }
}

/// Path parameters; a malformed segment is a 400 in the caller's format.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(PathParam(value)),
            Err(e) => Err(PageError::new(
                ClientKind::for_request(parts.uri.path(), &parts.headers),
                AppError::BadRequest(format!("Invalid path parameter: {}", e.body_text())),
            )),
        }
    }
}

/// Query string parameters, rejected the same way as [`PathParam`].
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(e) => Err(PageError::new(
                ClientKind::for_request(parts.uri.path(), &parts.headers),
                AppError::BadRequest(format!("Invalid query parameters: {}", e.body_text())),
            )),
        }
    }
}

/// Request body decoded from JSON when the content type says so, otherwise from a form.
#[derive(Debug)]
pub enum Submitted<F, J> {
    Form(F),
    Json(J),
}

#[async_trait]
impl<S, F, J> FromRequest<S> for Submitted<F, J>
where
    S: Send + Sync,
    F: DeserializeOwned + Send,
    J: DeserializeOwned + Send,
{
    type Rejection = PageError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let kind = ClientKind::for_request(req.uri().path(), req.headers());
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<J>::from_request(req, state)
                .await
                .map_err(|e| PageError::new(kind, AppError::BadRequest(format!("Invalid JSON data: {}", e.body_text()))))?;
            Ok(Submitted::Json(body))
        } else {
            let Form(body) = Form::<F>::from_request(req, state)
                .await
                .map_err(|e| PageError::new(kind, AppError::BadRequest(format!("Invalid form data: {}", e.body_text()))))?;
            Ok(Submitted::Form(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_plain_browser_request() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        assert_eq!(ClientKind::from_headers(&headers), ClientKind::Browser);
    }

    #[test]
    fn test_json_accept_or_xhr_is_api() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(ClientKind::from_headers(&headers).is_api());

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(ClientKind::from_headers(&headers).is_api());

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(ClientKind::from_headers(&headers).is_api());
    }

    #[test]
    fn test_api_paths_are_api_regardless_of_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        assert_eq!(ClientKind::for_request("/api/strategies", &headers), ClientKind::Api);
        assert_eq!(ClientKind::for_request("/strategy/3", &headers), ClientKind::Browser);
    }
}
