use chrono::Utc;
use regex::Regex;
use sea_orm::{prelude::DatabaseConnection, ActiveValue::Set};
use serde::Deserialize;
use shared::entity::users;
use shared::security::{hash_password, verify_password};
use std::sync::{Arc, OnceLock};

use crate::error::AppError;
use crate::repositories::user_repository::UserRepository;

pub const PASSWORD_MIN_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> Vec<String> {
        static USERNAME: OnceLock<Regex> = OnceLock::new();
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        let username_re = USERNAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").expect("valid regex"));
        let email_re = EMAIL.get_or_init(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        let mut errors = Vec::new();
        if !username_re.is_match(self.username.trim()) {
            errors.push("Username must be 3-50 letters, digits, '.', '_' or '-'".to_string());
        }
        let email = self.email.trim();
        if email.len() > 100 || !email_re.is_match(email) {
            errors.push("Please enter a valid email address".to_string());
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            errors.push(format!("Password must be at least {} characters", PASSWORD_MIN_LEN));
        }
        errors
    }
}

pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let repo = UserRepository::new(db);
        Self { repo }
    }

    pub async fn register(&self, registration: Registration) -> Result<users::Model, AppError> {
        let errors = registration.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let username = registration.username.trim().to_string();
        let email = registration.email.trim().to_lowercase();

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(AppError::BadRequest("Username already registered".to_string()));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&registration.password);
        let user = self
            .repo
            .create(users::ActiveModel {
                username: Set(username),
                email: Set(email),
                password_hash: Set(password_hash),
                is_active: Set(true),
                is_superuser: Set(false),
                created_at: Set(Utc::now()),
                updated_at: Set(None),
                last_login: Set(None),
                ..Default::default()
            })
            .await?;
        tracing::info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// `None` when the username is unknown, the password is wrong, or the account is disabled.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<users::Model>, AppError> {
        let Some(user) = self.repo.find_by_username(username.trim()).await? else {
            tracing::warn!("Login failed: unknown user {}", username.trim());
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash) {
            tracing::warn!("Login failed: wrong password for {}", user.username);
            return Ok(None);
        }
        if !user.is_active {
            tracing::warn!("Login refused: user {} is not active", user.username);
            return Ok(None);
        }
        let user = self.repo.touch_last_login(user).await?;
        tracing::info!("User {} logged in", user.username);
        Ok(Some(user))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>, AppError> {
        Ok(self.repo.find_by_username(username).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str) -> Registration {
        Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration("trader_01", "trader@example.com", "secret1").validate().is_empty());
    }

    #[test]
    fn test_invalid_registration() {
        let errors = registration("ab", "not-an-email", "123").validate();
        assert_eq!(errors.len(), 3);
        assert!(registration("bad name", "a@b.co", "secret1").validate().len() == 1);
    }
}
