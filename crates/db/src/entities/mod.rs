//! Database entities.

pub mod account;
pub mod enforcement_action;
pub mod escalation_override;
pub mod violation;

pub use account::Entity as Account;
pub use enforcement_action::Entity as EnforcementAction;
pub use escalation_override::Entity as EscalationOverride;
pub use violation::Entity as Violation;
