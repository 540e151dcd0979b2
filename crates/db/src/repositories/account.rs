//! Account repository for ledger baseline rows and status writes.

use std::sync::Arc;

use crate::entities::{
    Account,
    account::{self, AccountStatus},
};
use gavel_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

/// Account repository for database operations.
#[derive(Clone)]
pub struct AccountRepository {
    db: Arc<DatabaseConnection>,
}

impl AccountRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get an account by ID.
    pub async fn get(&self, id: &str) -> AppResult<account::Model> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::UnknownAccount(id.to_string()))
    }

    /// Find an account by ID.
    pub async fn find(&self, id: &str) -> AppResult<Option<account::Model>> {
        Account::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch an account inside a caller-provided transaction.
    pub async fn find_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
    ) -> AppResult<Option<account::Model>> {
        Account::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ensure a baseline `active` account row exists, creating it if missing.
    pub async fn ensure(&self, id: &str) -> AppResult<account::Model> {
        if let Some(existing) = self.find(id).await? {
            return Ok(existing);
        }

        let model = account::ActiveModel {
            id: Set(id.to_string()),
            status: Set(AccountStatus::Active),
            created_at: Set(chrono::Utc::now().into()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the account status inside a caller-provided transaction.
    ///
    /// Status is only ever written through the action executor's
    /// transactional unit.
    pub async fn set_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: &str,
        status: AccountStatus,
    ) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        let result = Account::update_many()
            .col_expr(account::Column::Status, Expr::value(status))
            .filter(account::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::UnknownAccount(id.to_string()));
        }

        Ok(())
    }
}
