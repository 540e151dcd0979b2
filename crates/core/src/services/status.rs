//! Query/status service: read-side aggregation per account.

use chrono::Utc;
use gavel_common::{AppError, AppResult};
use gavel_db::{
    entities::{account::AccountStatus, enforcement_action, violation},
    repositories::{AccountRepository, EnforcementRepository, ViolationCounts, ViolationRepository},
};
use serde::Serialize;

/// Number of historical actions and violations returned in a status report.
const HISTORY_LIMIT: u64 = 50;

/// Aggregated enforcement state of one account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatusReport {
    pub current_status: AccountStatus,
    pub violation_counts: ViolationCounts,
    /// Most recent violations, newest first.
    pub recent_violations: Vec<violation::Model>,
    pub last_action: Option<enforcement_action::Model>,
    /// Actions with a future deadline and no `processed_at`, exactly the
    /// set the deadline processor will later pick up.
    pub active_actions: Vec<enforcement_action::Model>,
    pub history: Vec<enforcement_action::Model>,
}

/// Status service. Read-only: never mutates the ledger.
#[derive(Clone)]
pub struct StatusService {
    account_repo: AccountRepository,
    violation_repo: ViolationRepository,
    enforcement_repo: EnforcementRepository,
}

impl StatusService {
    /// Create a new status service.
    #[must_use]
    pub const fn new(
        account_repo: AccountRepository,
        violation_repo: ViolationRepository,
        enforcement_repo: EnforcementRepository,
    ) -> Self {
        Self {
            account_repo,
            violation_repo,
            enforcement_repo,
        }
    }

    /// Build the status report for one account.
    pub async fn get_status(&self, account_id: &str) -> AppResult<AccountStatusReport> {
        let account = self
            .account_repo
            .find(account_id)
            .await?
            .ok_or_else(|| AppError::UnknownAccount(account_id.to_string()))?;

        let violation_counts = self.violation_repo.counts_by_severity(account_id).await?;
        let recent_violations = self
            .violation_repo
            .list_for_account(account_id, HISTORY_LIMIT)
            .await?;
        let last_action = self.enforcement_repo.last_action(account_id).await?;
        let active_actions = self
            .enforcement_repo
            .active_actions(account_id, Utc::now())
            .await?;
        let history = self
            .enforcement_repo
            .history(account_id, HISTORY_LIMIT)
            .await?;

        Ok(AccountStatusReport {
            current_status: account.status,
            violation_counts,
            recent_violations,
            last_action,
            active_actions,
            history,
        })
    }
}
