//! Enforcement repository for actions and escalation overrides.

use std::sync::Arc;

use crate::entities::{
    EnforcementAction, EscalationOverride, enforcement_action, escalation_override,
};
use chrono::{DateTime, Utc};
use gavel_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Enforcement repository for database operations.
#[derive(Clone)]
pub struct EnforcementRepository {
    db: Arc<DatabaseConnection>,
}

impl EnforcementRepository {
    /// Create a new enforcement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Enforcement Actions ==========

    /// Append a new enforcement action inside a caller-provided transaction.
    pub async fn insert_action<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: enforcement_action::ActiveModel,
    ) -> AppResult<enforcement_action::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find actions whose deadline has elapsed without being processed.
    pub async fn find_expired_unprocessed(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<enforcement_action::Model>> {
        EnforcementAction::find()
            .filter(enforcement_action::Column::Deadline.is_not_null())
            .filter(enforcement_action::Column::Deadline.lt(now))
            .filter(enforcement_action::Column::ProcessedAt.is_null())
            .order_by_asc(enforcement_action::Column::Deadline)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Claim an expired action for processing.
    ///
    /// Performs the atomic conditional update
    /// `SET processed_at = now WHERE id = ? AND processed_at IS NULL`.
    /// `processed_at` doubles as the optimistic lock token: a concurrent
    /// sweep loses the race, observes zero affected rows, and skips the row.
    pub async fn claim(&self, action_id: &str, now: DateTime<Utc>) -> AppResult<bool> {
        use sea_orm::sea_query::Expr;

        let result = EnforcementAction::update_many()
            .col_expr(enforcement_action::Column::ProcessedAt, Expr::value(now))
            .filter(enforcement_action::Column::Id.eq(action_id))
            .filter(enforcement_action::Column::ProcessedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Get the most recent action for an account.
    pub async fn last_action(
        &self,
        account_id: &str,
    ) -> AppResult<Option<enforcement_action::Model>> {
        EnforcementAction::find()
            .filter(enforcement_action::Column::AccountId.eq(account_id))
            .order_by_desc(enforcement_action::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get actions with a future deadline that have not been processed.
    ///
    /// This is exactly the set a future deadline sweep will pick up once
    /// the deadlines elapse.
    pub async fn active_actions(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<enforcement_action::Model>> {
        EnforcementAction::find()
            .filter(enforcement_action::Column::AccountId.eq(account_id))
            .filter(enforcement_action::Column::Deadline.is_not_null())
            .filter(enforcement_action::Column::Deadline.gt(now))
            .filter(enforcement_action::Column::ProcessedAt.is_null())
            .order_by_asc(enforcement_action::Column::Deadline)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the action history for an account, most recent first.
    pub async fn history(
        &self,
        account_id: &str,
        limit: u64,
    ) -> AppResult<Vec<enforcement_action::Model>> {
        EnforcementAction::find()
            .filter(enforcement_action::Column::AccountId.eq(account_id))
            .order_by_desc(enforcement_action::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ========== Escalation Overrides ==========

    /// Get the unconsumed override for an account, if any.
    pub async fn active_override(
        &self,
        account_id: &str,
    ) -> AppResult<Option<escalation_override::Model>> {
        EscalationOverride::find()
            .filter(escalation_override::Column::AccountId.eq(account_id))
            .filter(escalation_override::Column::ConsumedAt.is_null())
            .order_by_desc(escalation_override::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set a new override, invalidating any previous unconsumed one.
    ///
    /// Both writes happen in one transaction so at most one unconsumed
    /// override per account exists at any time.
    pub async fn replace_override(
        &self,
        model: escalation_override::ActiveModel,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<escalation_override::Model> {
        use sea_orm::sea_query::Expr;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        EscalationOverride::update_many()
            .col_expr(escalation_override::Column::ConsumedAt, Expr::value(now))
            .filter(escalation_override::Column::AccountId.eq(account_id))
            .filter(escalation_override::Column::ConsumedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted)
    }

    /// Clear the unconsumed override for an account.
    ///
    /// Returns the number of overrides invalidated (0 or 1).
    pub async fn clear_override(&self, account_id: &str, now: DateTime<Utc>) -> AppResult<u64> {
        use sea_orm::sea_query::Expr;

        let result = EscalationOverride::update_many()
            .col_expr(escalation_override::Column::ConsumedAt, Expr::value(now))
            .filter(escalation_override::Column::AccountId.eq(account_id))
            .filter(escalation_override::Column::ConsumedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Mark an override consumed inside a caller-provided transaction.
    ///
    /// Fails if the override was already consumed, so consumption can only
    /// succeed in the same atomic unit as the action it pinned.
    pub async fn consume_override<C: ConnectionTrait>(
        &self,
        conn: &C,
        override_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        let result = EscalationOverride::update_many()
            .col_expr(escalation_override::Column::ConsumedAt, Expr::value(now))
            .filter(escalation_override::Column::Id.eq(override_id))
            .filter(escalation_override::Column::ConsumedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "Override {override_id} already consumed"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::enforcement_action::ActionKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_action(id: &str, account_id: &str, kind: ActionKind) -> enforcement_action::Model {
        let now = Utc::now();
        enforcement_action::Model {
            id: id.to_string(),
            account_id: account_id.to_string(),
            kind,
            message: "Repeated violations".to_string(),
            effective_from: now.into(),
            deadline: Some((now - chrono::Duration::hours(1)).into()),
            processed_at: None,
            issued_by: Some("admin1".to_string()),
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_find_expired_unprocessed() {
        let a1 = test_action("a1", "acct1", ActionKind::Warning);
        let a2 = test_action("a2", "acct2", ActionKind::Suspension);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1, a2]])
                .into_connection(),
        );

        let repo = EnforcementRepository::new(db);
        let due = repo
            .find_expired_unprocessed(Utc::now(), 100)
            .await
            .unwrap();

        assert_eq!(due.len(), 2);
    }

    #[tokio::test]
    async fn test_claim_wins_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EnforcementRepository::new(db);
        assert!(repo.claim("a1", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_loses_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = EnforcementRepository::new(db);
        assert!(!repo.claim("a1", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_override_conflict_when_already_consumed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = EnforcementRepository::new(Arc::clone(&db));
        let err = repo
            .consume_override(db.as_ref(), "ov1", Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }
}
