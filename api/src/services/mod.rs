pub mod auth_service;
pub mod strategy_service;
pub mod user_service;
