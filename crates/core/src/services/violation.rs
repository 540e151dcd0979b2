//! Violation ingestion service.
//!
//! Violations are produced by an external detector; this service records
//! them in the append-only ledger and triggers the critical-severity fast
//! path.

use chrono::{DateTime, Utc};
use gavel_common::{AppError, AppResult, IdGenerator};
use gavel_db::{
    entities::{
        account::AccountStatus,
        enforcement_action,
        violation::{self, Severity},
    },
    repositories::{AccountRepository, ViolationRepository},
};
use sea_orm::Set;

use crate::services::executor::{ActionExecutor, EnforcementActionInput};
use crate::services::policy;

/// Input for recording a violation.
#[derive(Debug, Clone)]
pub struct RecordViolationInput {
    pub account_id: String,
    pub severity: Severity,
    pub reason: String,
    /// When the breach occurred. Defaults to now.
    pub detected_at: Option<DateTime<Utc>>,
}

/// A recorded violation, with the fast-path action if one fired.
#[derive(Debug, Clone)]
pub struct RecordedViolation {
    pub violation: violation::Model,
    /// The immediate suspension produced by a critical violation on an
    /// `active` account, if applicable.
    pub fast_path_action: Option<enforcement_action::Model>,
}

/// Violation ingestion service.
#[derive(Clone)]
pub struct ViolationService {
    account_repo: AccountRepository,
    violation_repo: ViolationRepository,
    executor: ActionExecutor,
    escalation_window_hours: u64,
    id_gen: IdGenerator,
}

impl ViolationService {
    /// Create a new violation service.
    #[must_use]
    pub const fn new(
        account_repo: AccountRepository,
        violation_repo: ViolationRepository,
        executor: ActionExecutor,
        escalation_window_hours: u64,
    ) -> Self {
        Self {
            account_repo,
            violation_repo,
            executor,
            escalation_window_hours,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a violation.
    ///
    /// Creates the implicit `active` baseline for first-time offenders. A
    /// critical violation on an `active` account suspends immediately,
    /// without waiting for a deadline sweep.
    pub async fn record(&self, input: RecordViolationInput) -> AppResult<RecordedViolation> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "Violation reason is required".to_string(),
            ));
        }
        if reason.len() > 2000 {
            return Err(AppError::BadRequest("Violation reason too long".to_string()));
        }

        let account = self.account_repo.ensure(&input.account_id).await?;

        let now = Utc::now();
        let id = self.id_gen.generate();
        let model = violation::ActiveModel {
            id: Set(id),
            account_id: Set(input.account_id.clone()),
            severity: Set(input.severity),
            reason: Set(reason.to_string()),
            detected_at: Set(input.detected_at.unwrap_or(now).into()),
            created_at: Set(now.into()),
        };

        let violation = self.violation_repo.create(model).await?;

        tracing::info!(
            account_id = %violation.account_id,
            violation_id = %violation.id,
            severity = ?violation.severity,
            "Violation recorded"
        );

        let fast_path_action = if input.severity == Severity::Critical {
            self.run_fast_path(&violation, account.status).await?
        } else {
            None
        };

        Ok(RecordedViolation {
            violation,
            fast_path_action,
        })
    }

    /// Apply the severity-weighted fast path when it is warranted.
    async fn run_fast_path(
        &self,
        violation: &violation::Model,
        status: AccountStatus,
    ) -> AppResult<Option<enforcement_action::Model>> {
        let Some(kind) = policy::critical_fast_path(status) else {
            return Ok(None);
        };

        let deadline = Utc::now()
            + chrono::Duration::hours(i64::try_from(self.escalation_window_hours).unwrap_or(72));

        let action = self
            .executor
            .apply(EnforcementActionInput {
                account_id: violation.account_id.clone(),
                kind,
                message: format!("Critical violation: {}", violation.reason),
                effective_from: None,
                deadline: Some(deadline),
                issued_by: None,
                consume_override: None,
                source_action: None,
            })
            .await?;

        tracing::warn!(
            account_id = %violation.account_id,
            violation_id = %violation.id,
            action_id = %action.id,
            "Critical violation fast path applied"
        );

        Ok(Some(action))
    }
}
