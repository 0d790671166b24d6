use anyhow::Result;
use sea_orm::{
    prelude::*,
    sea_query::{Expr, LikeExpr, SimpleExpr},
    Condition, DatabaseBackend, DatabaseTransaction, QueryOrder, QuerySelect, TransactionTrait,
};
use shared::entity::{strategies, users};
use std::sync::Arc;

pub struct StrategyRepository {
    db: Arc<DatabaseConnection>,
}

impl StrategyRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Strategies belonging to other users are treated as missing.
    pub async fn find_for_user(&self, strategy_id: i32, user_id: i32) -> Result<Option<strategies::Model>> {
        let strategy = strategies::Entity::find_by_id(strategy_id)
            .filter(strategies::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await?;
        Ok(strategy)
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        search: Option<&str>,
        limit: Option<u64>,
        offset: u64,
    ) -> Result<Vec<strategies::Model>> {
        let mut query = strategies::Entity::find()
            .filter(owned_matching(user_id, search))
            .order_by_desc(strategies::Column::CreatedAt)
            .order_by_desc(strategies::Column::Id)
            .offset(offset);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let strategies = query.all(self.db.as_ref()).await?;
        Ok(strategies)
    }

    pub async fn count_for_user(&self, user_id: i32, search: Option<&str>) -> Result<u64> {
        let count = strategies::Entity::find()
            .filter(owned_matching(user_id, search))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }

    /// Insert a strategy unless its owner already has `max` of them; `None` means
    /// the limit was reached. The count and the insert run in one transaction
    /// holding the owner's lock, so concurrent inserts cannot overshoot.
    pub async fn create_within_limit(
        &self,
        active_model: strategies::ActiveModel,
        user_id: i32,
        max: u64,
    ) -> Result<Option<strategies::Model>> {
        let txn = self.db.begin().await?;
        lock_owner(&txn, user_id).await?;

        let owned = strategies::Entity::find()
            .filter(strategies::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;
        if owned >= max {
            txn.rollback().await?;
            return Ok(None);
        }

        let strategy = active_model.insert(&txn).await?;
        txn.commit().await?;
        Ok(Some(strategy))
    }

    pub async fn update(&self, active_model: strategies::ActiveModel) -> Result<strategies::Model> {
        let strategy = active_model.update(self.db.as_ref()).await?;
        Ok(strategy)
    }

    pub async fn delete(&self, strategy_id: i32, user_id: i32) -> Result<bool> {
        let result = strategies::Entity::delete_many()
            .filter(strategies::Column::Id.eq(strategy_id))
            .filter(strategies::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }
}

async fn lock_owner(txn: &DatabaseTransaction, user_id: i32) -> Result<()> {
    match txn.get_database_backend() {
        // SQLite has no row locks; any write takes the database write lock
        // until the transaction ends, which serialises the other writers.
        DatabaseBackend::Sqlite => {
            users::Entity::update_many()
                .col_expr(users::Column::Id, SimpleExpr::from(Expr::col(users::Column::Id)))
                .filter(users::Column::Id.eq(user_id))
                .exec(txn)
                .await?;
        }
        _ => {
            users::Entity::find_by_id(user_id)
                .lock_exclusive()
                .one(txn)
                .await?;
        }
    }
    Ok(())
}

fn owned_matching(user_id: i32, search: Option<&str>) -> Condition {
    let mut condition = Condition::all().add(strategies::Column::UserId.eq(user_id));
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        let pattern = format!("%{}%", escape_like(term));
        condition = condition.add(
            Condition::any()
                .add(Expr::col(strategies::Column::Name).like(LikeExpr::new(pattern.clone()).escape('\\')))
                .add(Expr::col(strategies::Column::Description).like(LikeExpr::new(pattern).escape('\\'))),
        );
    }
    condition
}

/// Search terms match literally, so LIKE wildcards in them are escaped.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("RSI dip"), "RSI dip");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
