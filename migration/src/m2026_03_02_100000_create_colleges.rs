//! Migration to create the colleges table.
//!
//! Colleges are the root tenant scope; deleting a college cascades to its
//! students and courses through the foreign keys declared on those tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Colleges::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Colleges::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Colleges::Name).text().not_null())
                    .col(
                        ColumnDef::new(Colleges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Colleges::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Colleges {
    Table,
    Id,
    Name,
    CreatedAt,
}
