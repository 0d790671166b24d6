pub mod config;
pub mod database;
pub mod entity;
pub mod models;
pub mod security;
pub mod templates;

pub use config::Config;
pub use database::get_db_connection;
pub use models::*;
pub use templates::{generate_python_strategy, GeneratedStrategy, StrategyTemplate};
