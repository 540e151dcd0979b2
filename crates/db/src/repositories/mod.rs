//! Database repositories.

mod account;
mod enforcement;
mod violation;

pub use account::AccountRepository;
pub use enforcement::EnforcementRepository;
pub use violation::{ViolationCounts, ViolationRepository};
