//! Deadline processor: the idempotent sweep over expired actions.
//!
//! Correctness rests on claim-then-act: each expired row is first claimed
//! with an atomic conditional update on `processed_at`, then escalated.
//! A concurrent or repeated sweep loses the claim race and skips the row,
//! so the sweep is safe to trigger repeatedly and to run overlapping.

use std::time::Duration;

use chrono::Utc;
use gavel_common::{AppResult, config::SweepConfig};
use gavel_db::{
    entities::enforcement_action::{self, ActionKind},
    repositories::{AccountRepository, EnforcementRepository},
};
use serde::Serialize;

use crate::services::executor::{ActionExecutor, EnforcementActionInput};
use crate::services::policy;

/// One successfully escalated row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatedRow {
    /// The expired action that was claimed.
    pub action_id: String,
    /// The follow-up action the escalation produced.
    pub next_action_id: String,
    pub account_id: String,
}

/// One row that was claimed but failed to escalate.
///
/// The row stays claimed; it is surfaced here for operator reconciliation
/// instead of being retried (a retry would risk a duplicate escalation).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub action_id: String,
    pub account_id: String,
    pub error: String,
}

/// Outcome of one sweep run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    /// Rows claimed and successfully escalated.
    pub escalated: Vec<EscalatedRow>,
    /// Rows claimed whose escalation failed (for alerting).
    pub failed: Vec<FailedRow>,
    /// Rows whose claim was lost to a concurrent sweep.
    pub skipped: u64,
}

/// Deadline processor service.
#[derive(Clone)]
pub struct DeadlineProcessor {
    account_repo: AccountRepository,
    enforcement_repo: EnforcementRepository,
    executor: ActionExecutor,
    config: SweepConfig,
}

impl DeadlineProcessor {
    /// Create a new deadline processor.
    #[must_use]
    pub const fn new(
        account_repo: AccountRepository,
        enforcement_repo: EnforcementRepository,
        executor: ActionExecutor,
        config: SweepConfig,
    ) -> Self {
        Self {
            account_repo,
            enforcement_repo,
            executor,
            config,
        }
    }

    /// Run one sweep over expired, unprocessed actions.
    ///
    /// Row failures are isolated: one row failing (or timing out) never
    /// aborts the rest of the batch.
    pub async fn run(&self) -> AppResult<SweepSummary> {
        let now = Utc::now();
        let due = self
            .enforcement_repo
            .find_expired_unprocessed(now, self.config.batch_limit)
            .await?;

        let row_timeout = Duration::from_secs(self.config.row_timeout_secs);
        let mut summary = SweepSummary::default();

        for action in due {
            // Claim first. After this point the row will never be picked
            // up again, even if the escalation below fails.
            match self.enforcement_repo.claim(&action.id, Utc::now()).await {
                Ok(true) => {}
                Ok(false) => {
                    summary.skipped += 1;
                    continue;
                }
                // A failed claim leaves the row unclaimed; the next sweep
                // retries it. Only the batch query itself may abort a run.
                Err(e) => {
                    tracing::error!(
                        action_id = %action.id,
                        account_id = %action.account_id,
                        error = %e,
                        "Claim failed; row left for the next sweep"
                    );
                    summary.failed.push(FailedRow {
                        action_id: action.id.clone(),
                        account_id: action.account_id.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            }

            match tokio::time::timeout(row_timeout, self.escalate_row(&action)).await {
                Ok(Ok(next)) => {
                    summary.escalated.push(EscalatedRow {
                        action_id: action.id.clone(),
                        next_action_id: next.id,
                        account_id: action.account_id.clone(),
                    });
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        action_id = %action.id,
                        account_id = %action.account_id,
                        error = %e,
                        "Claimed action failed to escalate; manual reconciliation required"
                    );
                    summary.failed.push(FailedRow {
                        action_id: action.id.clone(),
                        account_id: action.account_id.clone(),
                        error: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::error!(
                        action_id = %action.id,
                        account_id = %action.account_id,
                        timeout_secs = self.config.row_timeout_secs,
                        "Claimed action timed out during escalation"
                    );
                    summary.failed.push(FailedRow {
                        action_id: action.id.clone(),
                        account_id: action.account_id.clone(),
                        error: format!(
                            "escalation timed out after {}s",
                            self.config.row_timeout_secs
                        ),
                    });
                }
            }
        }

        tracing::info!(
            escalated = summary.escalated.len(),
            failed = summary.failed.len(),
            skipped = summary.skipped,
            "Deadline sweep completed"
        );

        Ok(summary)
    }

    /// Escalate one claimed row through the policy and the executor.
    async fn escalate_row(
        &self,
        action: &enforcement_action::Model,
    ) -> AppResult<enforcement_action::Model> {
        let account = self.account_repo.find(&action.account_id).await?;
        let active_override = self
            .enforcement_repo
            .active_override(&action.account_id)
            .await?;

        let decision = policy::decide(
            &action.account_id,
            account.map(|a| a.status),
            active_override.as_ref(),
        )?;

        // Freezes are terminal for automatic escalation and get no
        // follow-up deadline; reinstatement never carries one.
        let deadline = match decision.kind {
            ActionKind::Warning | ActionKind::Suspension => Some(
                Utc::now() + chrono::Duration::hours(self.escalation_window_hours_i64()),
            ),
            ActionKind::Freeze | ActionKind::Reinstatement => None,
        };

        self.executor
            .apply(EnforcementActionInput {
                account_id: action.account_id.clone(),
                kind: decision.kind,
                message: format!(
                    "Deadline elapsed without resolution of {:?} action {}",
                    action.kind, action.id
                ),
                effective_from: None,
                deadline,
                issued_by: None,
                consume_override: decision.consumed_override,
                source_action: Some(action.clone()),
            })
            .await
    }

    fn escalation_window_hours_i64(&self) -> i64 {
        i64::try_from(self.config.escalation_window_hours).unwrap_or(72)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::notification::TracingSink;
    use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn processor_with(db: Arc<DatabaseConnection>) -> DeadlineProcessor {
        let executor = ActionExecutor::new(
            Arc::clone(&db),
            AccountRepository::new(Arc::clone(&db)),
            EnforcementRepository::new(Arc::clone(&db)),
            Arc::new(TracingSink),
        );
        DeadlineProcessor::new(
            AccountRepository::new(Arc::clone(&db)),
            EnforcementRepository::new(db),
            executor,
            SweepConfig::default(),
        )
    }

    fn expired_action(id: &str) -> enforcement_action::Model {
        let now = Utc::now();
        enforcement_action::Model {
            id: id.to_string(),
            account_id: "acct1".to_string(),
            kind: ActionKind::Warning,
            message: "warning".to_string(),
            effective_from: now.into(),
            deadline: Some((now - chrono::Duration::hours(1)).into()),
            processed_at: None,
            issued_by: Some("admin1".to_string()),
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_empty_sweep() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<enforcement_action::Model>::new()])
                .into_connection(),
        );

        let summary = processor_with(db).run().await.unwrap();
        assert!(summary.escalated.is_empty());
        assert!(summary.failed.is_empty());
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_lost_claim_is_skipped() {
        // One due row whose claim is lost to a concurrent sweep
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expired_action("a1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let summary = processor_with(db).run().await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(summary.escalated.is_empty());
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_claim_error_does_not_abort_the_batch() {
        // Two due rows. The first claim hits a transient database error
        // and the second loses the race. The run must finish, reporting
        // the errored row as failed so the next sweep can retry it.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expired_action("a1"), expired_action("a2")]])
                .append_exec_errors([DbErr::Custom("connection reset".to_string())])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let summary = processor_with(db).run().await.unwrap();
        assert!(summary.escalated.is_empty());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].action_id, "a1");
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_post_claim_failure_is_isolated() {
        // Claim succeeds, but the account row is gone: the row must land
        // in `failed` without erroring the sweep itself.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[expired_action("a1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([Vec::<gavel_db::entities::account::Model>::new()])
                .append_query_results([Vec::<gavel_db::entities::escalation_override::Model>::new()])
                .into_connection(),
        );

        let summary = processor_with(db).run().await.unwrap();
        assert!(summary.escalated.is_empty());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].action_id, "a1");
    }
}
