//! Violation repository for the append-only breach ledger.

use std::sync::Arc;

use crate::entities::{
    Violation,
    violation::{self, Severity},
};
use gavel_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Violation counts broken down by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ViolationCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl ViolationCounts {
    /// Total violations across all severities.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.low + self.medium + self.high + self.critical
    }
}

/// Violation repository for database operations.
///
/// Violations are append-only; this repository deliberately exposes no
/// update or delete operation.
#[derive(Clone)]
pub struct ViolationRepository {
    db: Arc<DatabaseConnection>,
}

impl ViolationRepository {
    /// Create a new violation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a new violation.
    pub async fn create(&self, model: violation::ActiveModel) -> AppResult<violation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count violations for an account, per severity.
    pub async fn counts_by_severity(&self, account_id: &str) -> AppResult<ViolationCounts> {
        let mut counts = ViolationCounts::default();

        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            let count = Violation::find()
                .filter(violation::Column::AccountId.eq(account_id))
                .filter(violation::Column::Severity.eq(severity))
                .count(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            match severity {
                Severity::Low => counts.low = count,
                Severity::Medium => counts.medium = count,
                Severity::High => counts.high = count,
                Severity::Critical => counts.critical = count,
            }
        }

        Ok(counts)
    }

    /// Get the most recent violations for an account.
    pub async fn list_for_account(
        &self,
        account_id: &str,
        limit: u64,
    ) -> AppResult<Vec<violation::Model>> {
        Violation::find()
            .filter(violation::Column::AccountId.eq(account_id))
            .order_by_desc(violation::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
