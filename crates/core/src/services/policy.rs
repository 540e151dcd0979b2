//! Escalation policy: the pure decision function for the sanctions ladder.
//!
//! The ladder is `active -> warned -> suspended -> frozen`. Reinstatement
//! is manual-only and resets any state to `active`. `frozen` is terminal
//! for automatic escalation.

use gavel_common::{AppError, AppResult};
use gavel_db::entities::{
    account::AccountStatus, enforcement_action::ActionKind, escalation_override,
};

/// The outcome of one escalation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The action kind to apply.
    pub kind: ActionKind,
    /// ID of the override that produced this decision, if any.
    ///
    /// The caller must consume the override in the same atomic unit as the
    /// resulting action, so an override is never consumed without being
    /// applied.
    pub consumed_override: Option<String>,
}

/// Position of a status on the ladder. Higher rank = harsher sanction.
#[must_use]
pub const fn rank(status: AccountStatus) -> u8 {
    match status {
        AccountStatus::Active => 0,
        AccountStatus::Warned => 1,
        AccountStatus::Suspended => 2,
        AccountStatus::Frozen => 3,
    }
}

/// The account status implied by applying an action kind.
#[must_use]
pub const fn status_for_kind(kind: ActionKind) -> AccountStatus {
    match kind {
        ActionKind::Warning => AccountStatus::Warned,
        ActionKind::Suspension => AccountStatus::Suspended,
        ActionKind::Freeze => AccountStatus::Frozen,
        ActionKind::Reinstatement => AccountStatus::Active,
    }
}

/// The next rung on the default ladder, or None from `frozen`.
#[must_use]
pub const fn next_rung(status: AccountStatus) -> Option<ActionKind> {
    match status {
        AccountStatus::Active => Some(ActionKind::Warning),
        AccountStatus::Warned => Some(ActionKind::Suspension),
        AccountStatus::Suspended => Some(ActionKind::Freeze),
        AccountStatus::Frozen => None,
    }
}

/// The severity-weighted fast path: a critical violation on an `active`
/// account suspends immediately, without waiting for a deadline sweep.
#[must_use]
pub const fn critical_fast_path(status: AccountStatus) -> Option<ActionKind> {
    match status {
        AccountStatus::Active => Some(ActionKind::Suspension),
        AccountStatus::Warned | AccountStatus::Suspended | AccountStatus::Frozen => None,
    }
}

/// Decide the next automatic action for an account.
///
/// An unconsumed override pins the decided kind for exactly this cycle;
/// otherwise the default is the next rung on the ladder.
///
/// # Errors
///
/// - [`AppError::UnknownAccount`] if the account has no ledger baseline
///   (`status` is None); callers must create an implicit `active` baseline
///   first.
/// - [`AppError::InvalidTransition`] when asked to escalate automatically
///   from `frozen`; only an explicit reinstatement request may leave that
///   state.
pub fn decide(
    account_id: &str,
    status: Option<AccountStatus>,
    active_override: Option<&escalation_override::Model>,
) -> AppResult<Decision> {
    let status = status.ok_or_else(|| AppError::UnknownAccount(account_id.to_string()))?;

    if status == AccountStatus::Frozen {
        return Err(AppError::InvalidTransition(format!(
            "Account {account_id} is frozen; automatic escalation requires reinstatement first"
        )));
    }

    if let Some(pinned) = active_override {
        return Ok(Decision {
            kind: pinned.pinned_kind,
            consumed_override: Some(pinned.id.clone()),
        });
    }

    // Frozen was rejected above, so the ladder always has a next rung here
    let kind = next_rung(status).ok_or_else(|| {
        AppError::InvalidTransition(format!("Account {account_id} has no next ladder rung"))
    })?;

    Ok(Decision {
        kind,
        consumed_override: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_override(id: &str, account_id: &str, pinned: ActionKind) -> escalation_override::Model {
        escalation_override::Model {
            id: id.to_string(),
            account_id: account_id.to_string(),
            pinned_kind: pinned,
            set_by: "admin1".to_string(),
            created_at: Utc::now().into(),
            consumed_at: None,
        }
    }

    #[test]
    fn test_default_ladder_order() {
        assert_eq!(
            decide("a", Some(AccountStatus::Active), None).unwrap().kind,
            ActionKind::Warning
        );
        assert_eq!(
            decide("a", Some(AccountStatus::Warned), None).unwrap().kind,
            ActionKind::Suspension
        );
        assert_eq!(
            decide("a", Some(AccountStatus::Suspended), None)
                .unwrap()
                .kind,
            ActionKind::Freeze
        );
    }

    #[test]
    fn test_frozen_is_terminal() {
        let err = decide("a", Some(AccountStatus::Frozen), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_frozen_rejects_even_with_override() {
        let pinned = test_override("ov1", "a", ActionKind::Freeze);
        let err = decide("a", Some(AccountStatus::Frozen), Some(&pinned)).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn test_unknown_account() {
        let err = decide("ghost", None, None).unwrap_err();
        assert!(matches!(err, AppError::UnknownAccount(_)));
    }

    #[test]
    fn test_override_pins_decision() {
        let pinned = test_override("ov1", "a", ActionKind::Freeze);
        let decision = decide("a", Some(AccountStatus::Active), Some(&pinned)).unwrap();

        assert_eq!(decision.kind, ActionKind::Freeze);
        assert_eq!(decision.consumed_override.as_deref(), Some("ov1"));
    }

    #[test]
    fn test_ladder_rank_is_monotone() {
        assert!(rank(AccountStatus::Active) < rank(AccountStatus::Warned));
        assert!(rank(AccountStatus::Warned) < rank(AccountStatus::Suspended));
        assert!(rank(AccountStatus::Suspended) < rank(AccountStatus::Frozen));
    }

    #[test]
    fn test_repeated_decide_never_regresses() {
        // Ladder monotonicity: following default decisions from `active`
        // only ever moves the status forward until frozen.
        let mut status = AccountStatus::Active;
        let mut previous_rank = rank(status);

        while let Ok(decision) = decide("a", Some(status), None) {
            status = status_for_kind(decision.kind);
            assert!(rank(status) > previous_rank);
            previous_rank = rank(status);
        }

        assert_eq!(status, AccountStatus::Frozen);
    }

    #[test]
    fn test_critical_fast_path_only_from_active() {
        assert_eq!(
            critical_fast_path(AccountStatus::Active),
            Some(ActionKind::Suspension)
        );
        assert_eq!(critical_fast_path(AccountStatus::Warned), None);
        assert_eq!(critical_fast_path(AccountStatus::Suspended), None);
        assert_eq!(critical_fast_path(AccountStatus::Frozen), None);
    }

    #[test]
    fn test_status_for_kind() {
        assert_eq!(
            status_for_kind(ActionKind::Reinstatement),
            AccountStatus::Active
        );
        assert_eq!(status_for_kind(ActionKind::Freeze), AccountStatus::Frozen);
    }
}
