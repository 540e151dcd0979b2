//! Database migrations.
//!
//! Schema migrations for the enforcement ledger.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_account_table;
mod m20250101_000002_create_violation_table;
mod m20250101_000003_create_enforcement_action_table;
mod m20250101_000004_create_escalation_override_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_account_table::Migration),
            Box::new(m20250101_000002_create_violation_table::Migration),
            Box::new(m20250101_000003_create_enforcement_action_table::Migration),
            Box::new(m20250101_000004_create_escalation_override_table::Migration),
        ]
    }
}
