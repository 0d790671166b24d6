//! Request extractors for the signed-in user.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use shared::entity::users;
use std::convert::Infallible;
use std::sync::Arc;

use crate::error::AppError;
use crate::negotiate::ClientKind;
use crate::services::auth_service::{resolve_user, token_from_request};
use crate::state::AppState;

/// The authenticated user; anonymous requests are rejected.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

/// The authenticated user if there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<users::Model>);

/// Public view of a user, safe to serialize or render.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<&users::Model> for UserView {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            last_login: user.last_login.map(|t| t.to_rfc3339()),
        }
    }
}

async fn lookup(parts: &mut Parts, state: &AppState) -> Option<users::Model> {
    let jar = CookieJar::from_headers(&parts.headers);
    let (token, source) = token_from_request(&jar, &parts.headers)?;
    resolve_user(state, &token, source).await
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(lookup(parts, state).await))
    }
}

pub enum AuthRejection {
    Login,
    Api,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Login => Redirect::to("/auth/login").into_response(),
            AuthRejection::Api => {
                AppError::Unauthorized("Could not validate credentials".to_string()).into_response()
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        match lookup(parts, state).await {
            Some(user) => Ok(CurrentUser(user)),
            None => match ClientKind::for_request(parts.uri.path(), &parts.headers) {
                ClientKind::Api => Err(AuthRejection::Api),
                ClientKind::Browser => {
                    tracing::info!("Anonymous request to {} redirected to login", parts.uri.path());
                    Err(AuthRejection::Login)
                }
            },
        }
    }
}
