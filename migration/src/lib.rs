pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_users_and_strategies;
mod m20250615_000001_add_user_last_login;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_users_and_strategies::Migration),
            Box::new(m20250615_000001_add_user_last_login::Migration),
        ]
    }
}
