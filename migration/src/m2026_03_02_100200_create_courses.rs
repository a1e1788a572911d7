//! Migration to create the courses table.
//!
//! Course names are unique within a college; the college foreign key
//! cascades on delete.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Name).text().not_null())
                    .col(ColumnDef::new(Courses::CourseCode).text().not_null())
                    .col(ColumnDef::new(Courses::CollegeId).uuid().not_null())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_college_id")
                            .from(Courses::Table, Courses::CollegeId)
                            .to(Colleges::Table, Colleges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_name_college_unique")
                    .table(Courses::Table)
                    .col(Courses::Name)
                    .col(Courses::CollegeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_college_id")
                    .table(Courses::Table)
                    .col(Courses::CollegeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_courses_name_college_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_courses_college_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Name,
    CourseCode,
    CollegeId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Colleges {
    Table,
    Id,
}
