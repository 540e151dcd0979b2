//! Enforcement action entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The kind of sanction applied by an enforcement action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "suspension")]
    Suspension,
    #[sea_orm(string_value = "freeze")]
    Freeze,
    #[sea_orm(string_value = "reinstatement")]
    Reinstatement,
}

/// Enforcement action model - a decision applied to an account.
///
/// Rows are append-only. The single exception is `processed_at`, which is
/// set at most once by the deadline sweep's atomic claim.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "enforcement_action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The sanctioned account.
    pub account_id: String,
    /// Kind of sanction.
    pub kind: ActionKind,
    /// Human-readable rationale.
    pub message: String,
    /// When the action takes effect.
    pub effective_from: DateTimeWithTimeZone,
    /// When unresolved escalation should trigger (None = no follow-up).
    pub deadline: Option<DateTimeWithTimeZone>,
    /// Set exactly once when the deadline-triggered escalation has run.
    pub processed_at: Option<DateTimeWithTimeZone>,
    /// Admin who issued the action (None = system-generated).
    pub issued_by: Option<String>,
    /// When the action was recorded.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
