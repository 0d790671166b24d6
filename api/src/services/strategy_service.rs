use chrono::Utc;
use sea_orm::{prelude::DatabaseConnection, ActiveValue::Set, IntoActiveModel};
use serde::Serialize;
use shared::entity::strategies;
use shared::{generate_python_strategy, GeneratedStrategy, StrategyDraft, StrategyParams};
use std::sync::Arc;

use crate::error::AppError;
use crate::repositories::strategy_repository::StrategyRepository;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// One page of a user's strategies.
#[derive(Debug, Clone)]
pub struct StrategyPage {
    pub strategies: Vec<strategies::Model>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u64, offset: u64) -> Self {
        Self {
            total,
            limit,
            offset,
            has_next: offset.saturating_add(limit) < total,
        }
    }
}

pub struct StrategyService {
    repo: StrategyRepository,
    max_per_user: u64,
}

impl StrategyService {
    pub fn new(db: Arc<DatabaseConnection>, max_per_user: u64) -> Self {
        let repo = StrategyRepository::new(db);
        Self { repo, max_per_user }
    }

    /// Generate code for parameters without storing anything.
    pub fn preview(&self, params: &StrategyParams) -> Result<GeneratedStrategy, AppError> {
        let errors = params.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(generate_python_strategy(params)?)
    }

    pub async fn create(&self, user_id: i32, draft: StrategyDraft) -> Result<strategies::Model, AppError> {
        let errors = draft.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let generated = generate_python_strategy(&draft.params)?;
        let params = draft.params;
        let model = strategies::ActiveModel {
            user_id: Set(user_id),
            name: Set(draft.name),
            description: Set(draft.description),
            indicator: Set(params.indicator.as_str().to_string()),
            operator: Set(params.operator.as_str().to_string()),
            value: Set(params.value),
            stop_loss: Set(params.stop_loss),
            target: Set(params.target),
            capital: Set(params.capital),
            generated_code: Set(generated.code),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };
        let strategy = self
            .repo
            .create_within_limit(model, user_id, self.max_per_user)
            .await?
            .ok_or_else(|| self.limit_reached(user_id))?;
        tracing::info!(
            "Created strategy {} '{}' for user {}",
            strategy.id,
            strategy.name,
            user_id
        );
        Ok(strategy)
    }

    pub async fn get(&self, strategy_id: i32, user_id: i32) -> Result<strategies::Model, AppError> {
        self.repo
            .find_for_user(strategy_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Strategy"))
    }

    /// Every strategy the user owns, newest first, optionally filtered by name/description.
    pub async fn list(&self, user_id: i32, search: Option<&str>) -> Result<Vec<strategies::Model>, AppError> {
        Ok(self.repo.list_for_user(user_id, search, None, 0).await?)
    }

    pub async fn page(
        &self,
        user_id: i32,
        search: Option<&str>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<StrategyPage, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        let offset = offset.unwrap_or(0);
        let total = self.repo.count_for_user(user_id, search).await?;
        let strategies = self
            .repo
            .list_for_user(user_id, search, Some(limit), offset)
            .await?;
        Ok(StrategyPage {
            strategies,
            pagination: Pagination::new(total, limit, offset),
        })
    }

    pub async fn count(&self, user_id: i32) -> Result<u64, AppError> {
        Ok(self.repo.count_for_user(user_id, None).await?)
    }

    /// Replace name, description and parameters; the code is regenerated.
    pub async fn update(
        &self,
        strategy_id: i32,
        user_id: i32,
        draft: StrategyDraft,
    ) -> Result<strategies::Model, AppError> {
        let errors = draft.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        let existing = self.get(strategy_id, user_id).await?;
        let generated = generate_python_strategy(&draft.params)?;
        let params = draft.params;

        let mut active = existing.into_active_model();
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.indicator = Set(params.indicator.as_str().to_string());
        active.operator = Set(params.operator.as_str().to_string());
        active.value = Set(params.value);
        active.stop_loss = Set(params.stop_loss);
        active.target = Set(params.target);
        active.capital = Set(params.capital);
        active.generated_code = Set(generated.code);
        active.updated_at = Set(Some(Utc::now()));

        let strategy = self.repo.update(active).await?;
        tracing::info!("Updated strategy {} for user {}", strategy.id, user_id);
        Ok(strategy)
    }

    pub async fn delete(&self, strategy_id: i32, user_id: i32) -> Result<(), AppError> {
        if !self.repo.delete(strategy_id, user_id).await? {
            return Err(AppError::not_found("Strategy"));
        }
        tracing::info!("Deleted strategy {} for user {}", strategy_id, user_id);
        Ok(())
    }

    /// Copy of an owned strategy named `"<name> (Copy)"`; the stored code is kept as is.
    pub async fn duplicate(&self, strategy_id: i32, user_id: i32) -> Result<strategies::Model, AppError> {
        let original = self.get(strategy_id, user_id).await?;
        let model = strategies::ActiveModel {
            user_id: Set(user_id),
            name: Set(copy_name(&original.name)),
            description: Set(original.description.clone()),
            indicator: Set(original.indicator.clone()),
            operator: Set(original.operator.clone()),
            value: Set(original.value),
            stop_loss: Set(original.stop_loss),
            target: Set(original.target),
            capital: Set(original.capital),
            generated_code: Set(original.generated_code.clone()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };
        let copy = self
            .repo
            .create_within_limit(model, user_id, self.max_per_user)
            .await?
            .ok_or_else(|| self.limit_reached(user_id))?;
        tracing::info!(
            "Duplicated strategy {} as {} for user {}",
            original.id,
            copy.id,
            user_id
        );
        Ok(copy)
    }

    fn limit_reached(&self, user_id: i32) -> AppError {
        tracing::warn!("User {} hit the strategy limit of {}", user_id, self.max_per_user);
        AppError::Conflict(format!(
            "Strategy limit reached: at most {} strategies per user",
            self.max_per_user
        ))
    }
}

/// Names are capped at 100 characters, so long names are shortened before the suffix.
fn copy_name(name: &str) -> String {
    const SUFFIX: &str = " (Copy)";
    let room = shared::models::NAME_MAX_LEN - SUFFIX.chars().count();
    let base: String = name.chars().take(room).collect();
    format!("{}{}", base.trim_end(), SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_has_next() {
        assert!(Pagination::new(25, 10, 0).has_next);
        assert!(Pagination::new(25, 10, 10).has_next);
        assert!(!Pagination::new(25, 10, 20).has_next);
        assert!(!Pagination::new(0, 10, 0).has_next);
    }

    #[test]
    fn test_copy_name() {
        assert_eq!(copy_name("RSI dip"), "RSI dip (Copy)");
        let long = "x".repeat(100);
        let copied = copy_name(&long);
        assert_eq!(copied.chars().count(), 100);
        assert!(copied.ends_with(" (Copy)"));
    }
}
