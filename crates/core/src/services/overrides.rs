//! Escalation override management.

use chrono::Utc;
use gavel_common::{AppError, AppResult, IdGenerator};
use gavel_db::{
    entities::{enforcement_action::ActionKind, escalation_override},
    repositories::{AccountRepository, EnforcementRepository},
};
use sea_orm::Set;

/// Escalation override service.
#[derive(Clone)]
pub struct OverrideService {
    account_repo: AccountRepository,
    enforcement_repo: EnforcementRepository,
    id_gen: IdGenerator,
}

impl OverrideService {
    /// Create a new override service.
    #[must_use]
    pub const fn new(account_repo: AccountRepository, enforcement_repo: EnforcementRepository) -> Self {
        Self {
            account_repo,
            enforcement_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Pin the next automatic decision for an account.
    ///
    /// Any previous unconsumed override is invalidated in the same
    /// transaction, keeping at most one active override per account.
    pub async fn set(
        &self,
        admin_id: &str,
        account_id: &str,
        pinned_kind: ActionKind,
    ) -> AppResult<escalation_override::Model> {
        // Reinstatement is admin-only and never automatic, so it cannot be
        // pinned as the next automatic decision.
        if pinned_kind == ActionKind::Reinstatement {
            return Err(AppError::BadRequest(
                "Cannot pin reinstatement; issue it as a manual action".to_string(),
            ));
        }

        self.account_repo.ensure(account_id).await?;

        let now = Utc::now();
        let model = escalation_override::ActiveModel {
            id: Set(self.id_gen.generate()),
            account_id: Set(account_id.to_string()),
            pinned_kind: Set(pinned_kind),
            set_by: Set(admin_id.to_string()),
            created_at: Set(now.into()),
            consumed_at: Set(None),
        };

        let set = self
            .enforcement_repo
            .replace_override(model, account_id, now)
            .await?;

        tracing::info!(
            account_id = %account_id,
            override_id = %set.id,
            pinned_kind = ?pinned_kind,
            set_by = %admin_id,
            "Escalation override set"
        );

        Ok(set)
    }

    /// Clear the unconsumed override for an account, if any.
    ///
    /// Returns whether an override was actually cleared.
    pub async fn clear(&self, admin_id: &str, account_id: &str) -> AppResult<bool> {
        let cleared = self
            .enforcement_repo
            .clear_override(account_id, Utc::now())
            .await?;

        if cleared > 0 {
            tracing::info!(
                account_id = %account_id,
                cleared_by = %admin_id,
                "Escalation override cleared"
            );
        }

        Ok(cleared > 0)
    }

    /// Get the active override for an account.
    pub async fn get(&self, account_id: &str) -> AppResult<Option<escalation_override::Model>> {
        self.enforcement_repo.active_override(account_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_cannot_pin_reinstatement() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = OverrideService::new(
            AccountRepository::new(Arc::clone(&db)),
            EnforcementRepository::new(db),
        );

        let err = service
            .set("admin1", "acct1", ActionKind::Reinstatement)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
