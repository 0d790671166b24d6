use askama::Template;
use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::negotiate::ClientKind;
use crate::views::ErrorPage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn log(&self) {
        if let AppError::Internal(e) = self {
            tracing::error!("Internal error: {:#}", e);
        }
    }

    /// Browser rendering: error pages for 403/404/500, dashboard redirect otherwise.
    pub fn into_page_response(self) -> Response {
        self.log();
        let status = self.status();
        let message = self.public_message();
        match self {
            AppError::Unauthorized(_) => Redirect::to("/auth/login").into_response(),
            AppError::NotFound(_) | AppError::Forbidden(_) | AppError::Internal(_) => {
                let page = ErrorPage {
                    status: status.as_u16(),
                    title: status.canonical_reason().unwrap_or("Error").to_string(),
                    message,
                };
                match page.render() {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(e) => {
                        tracing::error!("Failed to render error page: {}", e);
                        (status, page.message).into_response()
                    }
                }
            }
            _ => {
                let target = format!("/dashboard?error={}", encode_query(&message));
                Redirect::to(&target).into_response()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let mut body = json!({ "status": "error", "error": self.public_message() });
        if let AppError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }
        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("Database error occurred"))
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("Template rendering failed"))
    }
}

/// An error paired with the kind of client that should receive it.
#[derive(Debug)]
pub struct PageError {
    kind: ClientKind,
    error: AppError,
}

impl PageError {
    pub fn new(kind: ClientKind, error: impl Into<AppError>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }
}

/// Errors raised by browser-only handlers render as pages.
impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        PageError::new(ClientKind::Browser, error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self.kind {
            ClientKind::Api => self.error.into_response(),
            ClientKind::Browser => self.error.into_page_response(),
        }
    }
}

pub trait ForClient<T> {
    fn for_client(self, kind: ClientKind) -> Result<T, PageError>;
}

impl<T, E: Into<AppError>> ForClient<T> for Result<T, E> {
    fn for_client(self, kind: ClientKind) -> Result<T, PageError> {
        self.map_err(|e| PageError::new(kind, e))
    }
}

pub fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::not_found("Strategy").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation(vec![]).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_stay_private() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused on 10.0.0.5"));
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_validation_message_joins_errors() {
        let err = AppError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "a; b");
    }

    #[test]
    fn test_browser_bad_request_redirects_to_dashboard() {
        let response = AppError::BadRequest("Stop loss must be between 0 and 100%".into()).into_page_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/dashboard?error=Stop+loss+must+be+between+0+and+100%25");
    }

    #[test]
    fn test_browser_internal_error_is_an_html_page() {
        let err: PageError = AppError::Internal(anyhow::anyhow!("database is locked")).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[test]
    fn test_api_unauthorized_sets_challenge() {
        let response = AppError::Unauthorized("Could not validate credentials".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
