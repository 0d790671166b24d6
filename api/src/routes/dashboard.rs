use axum::{
    extract::State,
    response::{Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{CurrentUser, MaybeUser, UserView};
use crate::error::PageError;
use crate::negotiate::QueryParams;
use crate::state::AppState;
use crate::views::{render, DashboardPage, HomePage, StrategyView};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/", get(|| async { Redirect::permanent("/dashboard") }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub q: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub error: Option<String>,
}

async fn home(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Result<Response, PageError> {
    Ok(render(&HomePage {
        app_name: state.config.app_name.clone(),
        user: user.as_ref().map(UserView::from),
    })?)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    QueryParams(params): QueryParams<DashboardQuery>,
) -> Result<Response, PageError> {
    let query = params.q.unwrap_or_default().trim().to_string();
    let search = (!query.is_empty()).then_some(query.as_str());
    let strategies = state.strategy_service.list(user.id, search).await?;
    let total = state.strategy_service.count(user.id).await?;

    Ok(render(&DashboardPage {
        app_name: state.config.app_name.clone(),
        user: Some(UserView::from(&user)),
        strategies: strategies.iter().map(StrategyView::from).collect(),
        total,
        limit: state.config.max_strategies_per_user,
        query,
        message: params.message.filter(|m| !m.is_empty()),
        message_type: params.message_type.unwrap_or_else(|| "info".to_string()),
        error: params.error.filter(|e| !e.is_empty()),
    })?)
}
