use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub mod api;
pub mod auth;
pub mod builder;
pub mod dashboard;
pub mod strategy;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(dashboard::router())
        .merge(auth::router())
        .merge(builder::router())
        .merge(strategy::router())
        .merge(api::router())
}
