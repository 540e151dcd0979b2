//! Escalation override entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::enforcement_action::ActionKind;

/// Escalation override model - a one-shot admin directive that pins the
/// next automatic decision to a specific action kind.
///
/// At most one unconsumed override exists per account; setting a new one
/// invalidates any previous unconsumed row in the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "escalation_override")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The account the override applies to.
    pub account_id: String,
    /// Action kind used instead of the default ladder step.
    pub pinned_kind: ActionKind,
    /// Admin who set the override.
    pub set_by: String,
    /// When the override was set.
    pub created_at: DateTimeWithTimeZone,
    /// When the override was consumed or invalidated (None = active).
    pub consumed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
