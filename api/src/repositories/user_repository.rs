use anyhow::Result;
use chrono::Utc;
use sea_orm::{prelude::*, ActiveValue::Set, IntoActiveModel};
use shared::entity::users;
use std::sync::Arc;

pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?;
        Ok(user)
    }

    pub async fn create(&self, active_model: users::ActiveModel) -> Result<users::Model> {
        let user = active_model.insert(self.db.as_ref()).await?;
        Ok(user)
    }

    pub async fn touch_last_login(&self, user: users::Model) -> Result<users::Model> {
        let mut active = user.into_active_model();
        active.last_login = Set(Some(Utc::now()));
        let user = active.update(self.db.as_ref()).await?;
        Ok(user)
    }
}
