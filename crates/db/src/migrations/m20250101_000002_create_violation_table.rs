//! Create violation table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Violation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Violation::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Violation::AccountId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Violation::Severity)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Violation::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Violation::DetectedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Violation::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_violation_account")
                            .from(Violation::Table, Violation::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on account_id for history and count queries
        manager
            .create_index(
                Index::create()
                    .name("idx_violation_account_id")
                    .table(Violation::Table)
                    .col(Violation::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Violation::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Violation {
    Table,
    Id,
    AccountId,
    Severity,
    Reason,
    DetectedAt,
    CreatedAt,
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
}
