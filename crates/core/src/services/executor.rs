//! Action executor: applies enforcement decisions to accounts.
//!
//! The ledger append, the account status write and any override
//! consumption happen in one database transaction, so a failure part-way
//! through never leaves the account inconsistent with its ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gavel_common::{AppError, AppResult, IdGenerator};
use gavel_db::{
    entities::enforcement_action::{self, ActionKind},
    repositories::{AccountRepository, EnforcementRepository},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

use crate::services::notification::{SharedSink, build_intent};
use crate::services::policy;

/// Input for applying an enforcement action.
#[derive(Debug, Clone)]
pub struct EnforcementActionInput {
    pub account_id: String,
    pub kind: ActionKind,
    pub message: String,
    /// Defaults to now.
    pub effective_from: Option<DateTime<Utc>>,
    /// Present for warning/suspension/freeze follow-up, absent for
    /// reinstatement or terminal actions.
    pub deadline: Option<DateTime<Utc>>,
    /// Admin identifier, or None for system-originated calls.
    pub issued_by: Option<String>,
    /// Override consumed by the decision that produced this action.
    pub consume_override: Option<String>,
    /// The expired action that triggered this escalation, when invoked by
    /// the deadline processor. Used for the double-fire guard.
    pub source_action: Option<enforcement_action::Model>,
}

/// Input for a manually issued admin action.
#[derive(Debug, Clone)]
pub struct IssueActionInput {
    pub account_id: String,
    pub kind: ActionKind,
    pub message: String,
    pub effective_from: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Action executor service.
#[derive(Clone)]
pub struct ActionExecutor {
    db: Arc<DatabaseConnection>,
    account_repo: AccountRepository,
    enforcement_repo: EnforcementRepository,
    sink: SharedSink,
    id_gen: IdGenerator,
}

impl ActionExecutor {
    /// Create a new action executor.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        account_repo: AccountRepository,
        enforcement_repo: EnforcementRepository,
        sink: SharedSink,
    ) -> Self {
        Self {
            db,
            account_repo,
            enforcement_repo,
            sink,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply an enforcement action.
    ///
    /// Appends the action, moves the account status and consumes the
    /// pinning override (if any) in one transaction, then emits the
    /// notification intent.
    pub async fn apply(
        &self,
        input: EnforcementActionInput,
    ) -> AppResult<enforcement_action::Model> {
        let message = input.message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest(
                "Action message is required".to_string(),
            ));
        }
        if message.len() > 2000 {
            return Err(AppError::BadRequest("Action message too long".to_string()));
        }

        // Double-fire guard: the deadline processor must never re-apply an
        // escalation for an action that was already claimed and processed.
        if let Some(source) = &input.source_action
            && source.processed_at.is_some()
        {
            return Err(AppError::DuplicateProcessing(format!(
                "Action {} was already processed",
                source.id
            )));
        }

        let now = Utc::now();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let account = self
            .account_repo
            .find_in(&txn, &input.account_id)
            .await?
            .ok_or_else(|| AppError::UnknownAccount(input.account_id.clone()))?;

        let new_status = policy::status_for_kind(input.kind);
        if policy::rank(new_status) < policy::rank(account.status)
            && input.kind != ActionKind::Reinstatement
        {
            return Err(AppError::IllegalEscalation(format!(
                "Cannot move account {} backward with {:?}",
                input.account_id, input.kind
            )));
        }

        let id = self.id_gen.generate();
        let model = enforcement_action::ActiveModel {
            id: Set(id),
            account_id: Set(input.account_id.clone()),
            kind: Set(input.kind),
            message: Set(message.to_string()),
            effective_from: Set(input.effective_from.unwrap_or(now).into()),
            deadline: Set(input.deadline.map(Into::into)),
            processed_at: Set(None),
            issued_by: Set(input.issued_by),
            created_at: Set(now.into()),
        };

        let action = self.enforcement_repo.insert_action(&txn, model).await?;

        self.account_repo
            .set_status(&txn, &input.account_id, new_status)
            .await?;

        // Consumption must share the apply transaction: an override is
        // never consumed without its pinned action landing.
        if let Some(override_id) = &input.consume_override {
            self.enforcement_repo
                .consume_override(&txn, override_id, now)
                .await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            account_id = %action.account_id,
            action_id = %action.id,
            kind = ?action.kind,
            issued_by = action.issued_by.as_deref().unwrap_or("system"),
            "Enforcement action applied"
        );

        self.sink.dispatch(build_intent(&action)).await;

        Ok(action)
    }

    /// Issue a manual action on behalf of an admin.
    ///
    /// Bypasses the escalation policy but still goes through [`apply`] for
    /// atomicity and notification emission. Creates the implicit `active`
    /// baseline when the account has no ledger state yet.
    ///
    /// [`apply`]: Self::apply
    pub async fn issue_manual(
        &self,
        admin_id: &str,
        input: IssueActionInput,
    ) -> AppResult<enforcement_action::Model> {
        self.account_repo.ensure(&input.account_id).await?;

        self.apply(EnforcementActionInput {
            account_id: input.account_id,
            kind: input.kind,
            message: input.message,
            effective_from: input.effective_from,
            deadline: input.deadline,
            issued_by: Some(admin_id.to_string()),
            consume_override: None,
            source_action: None,
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::notification::TracingSink;
    use gavel_db::entities::account::{self, AccountStatus};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn executor_with(db: Arc<DatabaseConnection>) -> ActionExecutor {
        ActionExecutor::new(
            Arc::clone(&db),
            AccountRepository::new(Arc::clone(&db)),
            EnforcementRepository::new(db),
            Arc::new(TracingSink),
        )
    }

    fn input(kind: ActionKind) -> EnforcementActionInput {
        EnforcementActionInput {
            account_id: "acct1".to_string(),
            kind,
            message: "Repeated violations".to_string(),
            effective_from: None,
            deadline: None,
            issued_by: Some("admin1".to_string()),
            consume_override: None,
            source_action: None,
        }
    }

    fn account_row(status: AccountStatus) -> account::Model {
        account::Model {
            id: "acct1".to_string(),
            status,
            created_at: Utc::now().into(),
        }
    }

    fn action_row(kind: ActionKind) -> enforcement_action::Model {
        let now = Utc::now();
        enforcement_action::Model {
            id: "act1".to_string(),
            account_id: "acct1".to_string(),
            kind,
            message: "Repeated violations".to_string(),
            effective_from: now.into(),
            deadline: None,
            processed_at: None,
            issued_by: Some("admin1".to_string()),
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_message() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let executor = executor_with(db);

        let mut bad = input(ActionKind::Warning);
        bad.message = "   ".to_string();

        let err = executor.apply(bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_rejects_backward_move() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account_row(AccountStatus::Frozen)]])
                .into_connection(),
        );
        let executor = executor_with(db);

        // Warning implies `warned`, a regression from `frozen`
        let err = executor.apply(input(ActionKind::Warning)).await.unwrap_err();
        assert!(matches!(err, AppError::IllegalEscalation(_)));
    }

    #[tokio::test]
    async fn test_reinstatement_may_move_backward() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account_row(AccountStatus::Frozen)]])
                .append_query_results([[action_row(ActionKind::Reinstatement)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let executor = executor_with(db);

        let action = executor.apply(input(ActionKind::Reinstatement)).await.unwrap();
        assert_eq!(action.kind, ActionKind::Reinstatement);
    }

    #[tokio::test]
    async fn test_duplicate_processing_guard() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let executor = executor_with(db);

        let mut processed = action_row(ActionKind::Warning);
        processed.processed_at = Some(Utc::now().into());

        let mut escalation = input(ActionKind::Suspension);
        escalation.source_action = Some(processed);

        let err = executor.apply(escalation).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateProcessing(_)));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<account::Model>::new()])
                .into_connection(),
        );
        let executor = executor_with(db);

        let err = executor.apply(input(ActionKind::Warning)).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownAccount(_)));
    }
}
