use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use shared::StrategyInput;
use std::sync::Arc;

use crate::auth::{CurrentUser, UserView};
use crate::error::{AppError, PageError};
use crate::state::AppState;
use crate::views::{render, BuilderPage};

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/builder", get(builder_page).post(submit))
}

#[derive(Debug, Default, Deserialize)]
pub struct BuilderForm {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(flatten)]
    pub input: StrategyInput,
}

impl BuilderForm {
    fn wants_save(&self) -> bool {
        self.action.as_deref().map(str::trim) == Some("save")
    }
}

async fn builder_page(State(state): State<Arc<AppState>>, CurrentUser(user): CurrentUser) -> Result<Response, PageError> {
    Ok(render(&BuilderPage::new(
        &state.config.app_name,
        UserView::from(&user),
        StrategyInput::default(),
    ))?)
}

/// Generates code for the submitted values; `action=save` also stores the strategy.
async fn submit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<BuilderForm>,
) -> Result<Response, PageError> {
    let save = form.wants_save();
    let mut page = BuilderPage::new(&state.config.app_name, UserView::from(&user), form.input);

    if save {
        let draft = match page.form.draft() {
            Ok(draft) => draft,
            Err(errors) => return rejected(page, errors, StatusCode::BAD_REQUEST),
        };
        return match state.strategy_service.create(user.id, draft).await {
            Ok(strategy) => Ok(Redirect::to(&format!("/strategy/{}", strategy.id)).into_response()),
            Err(AppError::Validation(errors)) => rejected(page, errors, StatusCode::BAD_REQUEST),
            Err(AppError::Conflict(message)) => rejected(page, vec![message], StatusCode::CONFLICT),
            Err(other) => Err(other.into()),
        };
    }

    let params = match page.form.params() {
        Ok(params) => params,
        Err(errors) => return rejected(page, errors, StatusCode::BAD_REQUEST),
    };
    page.generated = Some(state.strategy_service.preview(&params)?);
    Ok(render(&page)?)
}

fn rejected(mut page: BuilderPage, errors: Vec<String>, status: StatusCode) -> Result<Response, PageError> {
    tracing::info!("Builder form rejected with {} error(s)", errors.len());
    page.errors = errors;
    let mut response = render(&page)?;
    *response.status_mut() = status;
    Ok(response)
}
