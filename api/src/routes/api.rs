//! JSON endpoints for the single-page frontend and scripted clients.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::models::{Indicator, Operator, StrategyInput};
use std::sync::Arc;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::negotiate::{PathParam, QueryParams, Submitted};
use crate::routes::strategy::StrategyPayload;
use crate::services::strategy_service::MAX_PAGE_SIZE;
use crate::state::AppState;
use crate::views::StrategyView;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/strategies", get(list_strategies).post(create_strategy))
        .route("/api/strategy/preview", post(preview_strategy))
        .route("/api/strategy/indicators", get(indicators))
        .route("/api/strategy/operators", get(operators))
        .route("/api/strategy/:id/code", get(strategy_code))
        .route("/api/strategy/:id/duplicate", post(duplicate_strategy))
        .route("/health", get(health))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub q: Option<String>,
}

/// Listing entry; the generated code is only returned by the detail endpoints.
#[derive(Debug, Serialize)]
pub struct StrategySummary {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub indicator: String,
    pub operator: String,
    pub value: f64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<StrategyView> for StrategySummary {
    fn from(view: StrategyView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            description: view.description,
            indicator: view.indicator,
            operator: view.operator,
            value: view.value,
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

async fn list_strategies(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let limit = match query.limit {
        Some(limit) if !(1..=MAX_PAGE_SIZE as i64).contains(&limit) => {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )))
        }
        Some(limit) => Some(limit as u64),
        None => None,
    };
    let offset = match query.offset {
        Some(offset) if offset < 0 => {
            return Err(AppError::BadRequest("offset must be 0 or greater".to_string()))
        }
        Some(offset) => Some(offset as u64),
        None => None,
    };
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let page = state.strategy_service.page(user.id, search, limit, offset).await?;
    let strategies: Vec<StrategySummary> = page
        .strategies
        .iter()
        .map(|s| StrategySummary::from(StrategyView::from(s)))
        .collect();

    Ok(Json(json!({
        "status": "success",
        "strategies": strategies,
        "pagination": page.pagination,
    })))
}

async fn create_strategy(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Submitted<StrategyInput, StrategyPayload>,
) -> Result<Response, AppError> {
    let input = match body {
        Submitted::Form(input) => input,
        Submitted::Json(payload) => payload.into_input(),
    };
    let draft = input.draft().map_err(AppError::Validation)?;
    let strategy = state.strategy_service.create(user.id, draft).await?;

    let body = json!({
        "status": "success",
        "message": "Strategy created successfully",
        "strategy": StrategyView::from(&strategy),
        "redirect": format!("/strategy/{}", strategy.id),
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn preview_strategy(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    body: Submitted<StrategyInput, StrategyPayload>,
) -> Result<Json<Value>, AppError> {
    let input = match body {
        Submitted::Form(input) => input,
        Submitted::Json(payload) => payload.into_input(),
    };
    let params = input.params().map_err(AppError::Validation)?;
    let generated = state.strategy_service.preview(&params)?;

    Ok(Json(json!({
        "status": "success",
        "strategy_name": generated.strategy_name,
        "code": generated.code,
        "code_size": generated.code_size,
        "indicators_used": generated.indicators_used,
        "language": generated.language,
    })))
}

async fn strategy_code(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
) -> Result<Json<Value>, AppError> {
    let strategy = state.strategy_service.get(strategy_id, user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "strategy_id": strategy.id,
        "code": strategy.generated_code,
        "language": "python",
    })))
}

async fn duplicate_strategy(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    PathParam(strategy_id): PathParam<i32>,
) -> Result<Json<Value>, AppError> {
    let copy = state.strategy_service.duplicate(strategy_id, user.id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Strategy duplicated successfully",
        "original_id": strategy_id,
        "new_id": copy.id,
        "name": copy.name,
        "redirect": format!("/strategy/{}", copy.id),
    })))
}

async fn indicators() -> Json<Value> {
    let indicators: Vec<Value> = Indicator::ALL
        .iter()
        .map(|i| {
            json!({
                "value": i.as_str(),
                "label": i.label(),
                "description": i.description(),
            })
        })
        .collect();
    Json(json!({ "status": "success", "indicators": indicators }))
}

async fn operators() -> Json<Value> {
    let operators: Vec<Value> = Operator::ALL
        .iter()
        .map(|o| {
            json!({
                "value": o.as_str(),
                "code": o.code(),
                "label": o.label(),
                "description": o.description(),
                "kind": o.kind(),
            })
        })
        .collect();
    Json(json!({ "status": "success", "operators": operators }))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!("Health check database ping failed: {}", e);
            "unavailable"
        }
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if database == "ok" { "healthy" } else { "degraded" },
        "service": state.config.app_name,
        "version": env!("CARGO_PKG_VERSION"),
        "git_hash": env!("GIT_HASH"),
        "git_branch": env!("GIT_BRANCH"),
        "build_time": env!("BUILD_TIME"),
        "environment": state.config.app_env,
        "database": database,
    });
    (status, Json(body)).into_response()
}
