//! Create escalation_override table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EscalationOverride::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EscalationOverride::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EscalationOverride::AccountId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EscalationOverride::PinnedKind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EscalationOverride::SetBy)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EscalationOverride::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(EscalationOverride::ConsumedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escalation_override_account")
                            .from(EscalationOverride::Table, EscalationOverride::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for active-override lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_escalation_override_account_consumed")
                    .table(EscalationOverride::Table)
                    .col(EscalationOverride::AccountId)
                    .col(EscalationOverride::ConsumedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EscalationOverride::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EscalationOverride {
    Table,
    Id,
    AccountId,
    PinnedKind,
    SetBy,
    CreatedAt,
    ConsumedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
