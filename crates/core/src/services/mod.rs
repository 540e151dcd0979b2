//! Business logic services.

#![allow(missing_docs)]

pub mod executor;
pub mod notification;
pub mod overrides;
pub mod policy;
pub mod status;
pub mod sweep;
pub mod violation;

pub use executor::{ActionExecutor, EnforcementActionInput, IssueActionInput};
pub use notification::{
    IntentChannel, IntentPriority, NotificationIntent, NotificationSink, SharedSink, TracingSink,
    build_intent,
};
pub use overrides::OverrideService;
pub use policy::Decision;
pub use status::{AccountStatusReport, StatusService};
pub use sweep::{DeadlineProcessor, EscalatedRow, FailedRow, SweepSummary};
pub use violation::{RecordViolationInput, RecordedViolation, ViolationService};
