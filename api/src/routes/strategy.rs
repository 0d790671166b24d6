//! Strategy pages. Each handler answers browsers with HTML or redirects and
//! API clients with JSON, decided by [`ClientKind`].

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use shared::entity::strategies;
use shared::StrategyInput;
use std::sync::Arc;

use crate::auth::{CurrentUser, UserView};
use crate::error::{encode_query, AppError, ForClient, PageError};
use crate::negotiate::{ClientKind, PathParam, Submitted};
use crate::state::AppState;
use crate::views::{indicator_options, operator_options, render, StrategyEditPage, StrategyView, StrategyViewPage};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/strategy/:id", get(view_strategy))
        .route("/strategy/:id/edit", get(edit_form).post(update_strategy))
        .route("/strategy/:id/delete", post(delete_strategy))
}

/// Strategy fields as sent by JSON clients. Every field is optional so the same
/// shape serves creation (missing fields are reported) and partial edits
/// (missing fields keep their stored values).
#[derive(Debug, Default, Deserialize)]
pub struct StrategyPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub indicator: Option<String>,
    pub operator: Option<String>,
    pub value: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
    pub capital: Option<f64>,
}

impl StrategyPayload {
    pub fn into_input(self) -> StrategyInput {
        self.apply(StrategyInput::default())
    }

    pub fn merged_over(self, stored: &strategies::Model) -> StrategyInput {
        self.apply(StrategyInput::from_model(stored))
    }

    fn apply(self, mut input: StrategyInput) -> StrategyInput {
        let number = |v: f64| v.to_string();
        if let Some(name) = self.name {
            input.name = name;
        }
        if let Some(description) = self.description {
            input.description = description;
        }
        if let Some(indicator) = self.indicator {
            input.indicator = indicator;
        }
        if let Some(operator) = self.operator {
            input.operator = operator;
        }
        if let Some(value) = self.value {
            input.value = number(value);
        }
        if let Some(stop_loss) = self.stop_loss {
            input.stop_loss = number(stop_loss);
        }
        if let Some(target) = self.target {
            input.target = number(target);
        }
        if let Some(capital) = self.capital {
            input.capital = number(capital);
        }
        input
    }
}

async fn view_strategy(
    State(state): State<Arc<AppState>>,
    kind: ClientKind,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
) -> Result<Response, PageError> {
    tracing::info!("User {} viewing strategy {}", user.username, strategy_id);
    let strategy = state
        .strategy_service
        .get(strategy_id, user.id)
        .await
        .for_client(kind)?;
    let view = StrategyView::from(&strategy);

    if kind.is_api() {
        return Ok(Json(json!({ "status": "success", "strategy": view })).into_response());
    }
    render(&StrategyViewPage {
        app_name: state.config.app_name.clone(),
        user: Some(UserView::from(&user)),
        strategy: view,
    })
    .for_client(kind)
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    kind: ClientKind,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
) -> Result<Response, PageError> {
    let strategy = state
        .strategy_service
        .get(strategy_id, user.id)
        .await
        .for_client(kind)?;
    let form = StrategyInput::from_model(&strategy);

    if kind.is_api() {
        return Ok(Json(json!({
            "status": "success",
            "strategy": StrategyView::from(&strategy),
            "form_options": {
                "indicators": indicator_options(&form.indicator),
                "operators": operator_options(&form.operator),
            },
        }))
        .into_response());
    }
    render(&StrategyEditPage::new(
        &state.config.app_name,
        UserView::from(&user),
        strategy.id,
        form,
    ))
    .for_client(kind)
}

async fn update_strategy(
    State(state): State<Arc<AppState>>,
    kind: ClientKind,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
    body: Submitted<StrategyInput, StrategyPayload>,
) -> Result<Response, PageError> {
    let stored = state
        .strategy_service
        .get(strategy_id, user.id)
        .await
        .for_client(kind)?;

    let input = match body {
        Submitted::Form(input) => input,
        Submitted::Json(payload) => payload.merged_over(&stored),
    };

    let draft = match input.draft() {
        Ok(draft) => draft,
        Err(errors) if kind.is_api() => return Err(PageError::new(kind, AppError::Validation(errors))),
        Err(errors) => {
            tracing::info!("Edit of strategy {} rejected: {}", strategy_id, errors.join("; "));
            let mut page = StrategyEditPage::new(&state.config.app_name, UserView::from(&user), strategy_id, input);
            page.errors = errors;
            let mut response = render(&page).for_client(kind)?;
            *response.status_mut() = StatusCode::BAD_REQUEST;
            return Ok(response);
        }
    };

    let updated = state
        .strategy_service
        .update(strategy_id, user.id, draft)
        .await
        .for_client(kind)?;

    if kind.is_api() {
        return Ok(Json(json!({
            "status": "success",
            "message": "Strategy updated successfully",
            "strategy_id": updated.id,
            "strategy": StrategyView::from(&updated),
            "redirect": format!("/strategy/{}", updated.id),
        }))
        .into_response());
    }
    Ok(flash_redirect("Strategy updated successfully"))
}

async fn delete_strategy(
    State(state): State<Arc<AppState>>,
    kind: ClientKind,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
) -> Result<Response, PageError> {
    state
        .strategy_service
        .delete(strategy_id, user.id)
        .await
        .for_client(kind)?;

    if kind.is_api() {
        return Ok(Json(json!({
            "status": "success",
            "message": "Strategy deleted successfully",
            "redirect": "/dashboard",
        }))
        .into_response());
    }
    Ok(flash_redirect("Strategy deleted successfully"))
}

fn flash_redirect(message: &str) -> Response {
    Redirect::to(&format!("/dashboard?message={}&type=success", encode_query(message))).into_response()
}
