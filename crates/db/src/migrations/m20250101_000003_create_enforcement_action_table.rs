//! Create enforcement_action table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EnforcementAction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EnforcementAction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EnforcementAction::AccountId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EnforcementAction::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EnforcementAction::Message).text().not_null())
                    .col(
                        ColumnDef::new(EnforcementAction::EffectiveFrom)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EnforcementAction::Deadline).timestamp_with_time_zone())
                    .col(ColumnDef::new(EnforcementAction::ProcessedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(EnforcementAction::IssuedBy).string_len(64))
                    .col(
                        ColumnDef::new(EnforcementAction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enforcement_action_account")
                            .from(EnforcementAction::Table, EnforcementAction::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on account_id for history queries
        manager
            .create_index(
                Index::create()
                    .name("idx_enforcement_action_account_id")
                    .table(EnforcementAction::Table)
                    .col(EnforcementAction::AccountId)
                    .to_owned(),
            )
            .await?;

        // Composite index driving the deadline sweep scan
        manager
            .create_index(
                Index::create()
                    .name("idx_enforcement_action_deadline_processed")
                    .table(EnforcementAction::Table)
                    .col(EnforcementAction::Deadline)
                    .col(EnforcementAction::ProcessedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EnforcementAction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EnforcementAction {
    Table,
    Id,
    AccountId,
    Kind,
    Message,
    EffectiveFrom,
    Deadline,
    ProcessedAt,
    IssuedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
