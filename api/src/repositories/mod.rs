pub mod strategy_repository;
pub mod user_repository;
