use anyhow::Result;
use sea_orm::DatabaseConnection;
use shared::{get_db_connection, security::TokenKeys, Config};
use std::sync::Arc;

use crate::services::{strategy_service::StrategyService, user_service::UserService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<DatabaseConnection>,
    pub tokens: TokenKeys,
    pub user_service: Arc<UserService>,
    pub strategy_service: Arc<StrategyService>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let db = get_db_connection(&config.database_url).await?;
        tracing::info!("Connected to database successfully");
        Ok(Self::with_db(config, db))
    }

    pub fn with_db(config: Config, db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        let tokens = TokenKeys::new(&config.secret_key, config.access_token_expire_minutes);
        let user_service = Arc::new(UserService::new(db.clone()));
        let strategy_service = Arc::new(StrategyService::new(db.clone(), config.max_strategies_per_user));

        AppState {
            config: Arc::new(config),
            db,
            tokens,
            user_service,
            strategy_service,
        }
    }
}
