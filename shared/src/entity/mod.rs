pub mod strategies;
pub mod users;
