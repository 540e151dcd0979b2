//! Violation entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Violation severity, ordered low < medium < high < critical.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Violation model - an immutable record of a detected policy breach.
///
/// Violations are the primary audit input: once created, a row is never
/// mutated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "violation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// The offending account.
    pub account_id: String,
    /// Severity reported by the external detector.
    pub severity: Severity,
    /// Free-text reason for the violation.
    pub reason: String,
    /// When the breach occurred.
    pub detected_at: DateTimeWithTimeZone,
    /// When the breach was recorded.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
