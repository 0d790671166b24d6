use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{CurrentUser, MaybeUser, UserView};
use crate::error::{AppError, ForClient, PageError};
use crate::negotiate::{ClientKind, Submitted};
use crate::services::auth_service::{cleared_cookie, session_cookie};
use crate::services::user_service::Registration;
use crate::state::AppState;
use crate::views::{render, LoginPage, RegisterPage};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/register", get(register_page).post(register))
        .route("/auth/logout", post(logout))
        .route("/api/auth/token", post(issue_token))
        .route("/api/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

async fn login_page(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(render(&LoginPage {
        app_name: state.config.app_name.clone(),
        user: None,
        username: String::new(),
        error: None,
    })?)
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.user_service.authenticate(&form.username, &form.password).await? {
        Some(user) => {
            let token = state.tokens.issue(&user.username).for_client(ClientKind::Browser)?;
            let jar = jar.add(session_cookie(&state, token));
            Ok((jar, Redirect::to("/dashboard")).into_response())
        }
        None => {
            let page = LoginPage {
                app_name: state.config.app_name.clone(),
                user: None,
                username: form.username.trim().to_string(),
                error: Some("Incorrect username or password".to_string()),
            };
            let mut response = render(&page)?;
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            Ok(response)
        }
    }
}

async fn register_page(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Result<Response, PageError> {
    if user.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    Ok(render(&RegisterPage {
        app_name: state.config.app_name.clone(),
        user: None,
        username: String::new(),
        email: String::new(),
        errors: Vec::new(),
    })?)
}

async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<Registration>,
) -> Result<Response, PageError> {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();
    let errors = match state.user_service.register(form).await {
        Ok(user) => {
            let token = state.tokens.issue(&user.username).for_client(ClientKind::Browser)?;
            let jar = jar.add(session_cookie(&state, token));
            return Ok((jar, Redirect::to("/dashboard")).into_response());
        }
        Err(AppError::Validation(errors)) => errors,
        Err(AppError::BadRequest(message)) => vec![message],
        Err(other) => return Err(other.into()),
    };

    let mut response = render(&RegisterPage {
        app_name: state.config.app_name.clone(),
        user: None,
        username,
        email,
        errors,
    })?;
    *response.status_mut() = StatusCode::BAD_REQUEST;
    Ok(response)
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(cleared_cookie()), Redirect::to("/"))
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Token endpoint for non-browser clients; takes the login form or the same fields as JSON.
async fn issue_token(
    State(state): State<Arc<AppState>>,
    body: Submitted<LoginForm, LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let form = match body {
        Submitted::Form(form) | Submitted::Json(form) => form,
    };
    let Some(user) = state.user_service.authenticate(&form.username, &form.password).await? else {
        return Err(AppError::Unauthorized("Incorrect username or password".to_string()));
    };
    let access_token = state.tokens.issue(&user.username)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.tokens.lifetime_secs(),
    }))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserView> {
    Json(UserView::from(&user))
}
