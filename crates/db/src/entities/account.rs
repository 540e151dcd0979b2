//! Account entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account status along the escalation ladder.
///
/// Automatic escalation only ever moves forward:
/// `active -> warned -> suspended -> frozen`. A manual reinstatement resets
/// any state back to `active`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AccountStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "warned")]
    Warned,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "frozen")]
    Frozen,
}

/// Account model - the moderated subject.
///
/// The account itself is owned by the external identity provider; the
/// enforcement engine only reads and writes `status`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    /// Opaque identifier assigned by the identity provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Current position on the escalation ladder.
    pub status: AccountStatus,
    /// When the baseline ledger row was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
