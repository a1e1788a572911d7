//! Migration to create the course_timetables table.
//!
//! Each row is one weekly recurring interval on a named day. A
//! midnight-crossing interval is stored as two rows linked by `parent_id`;
//! deleting the parent cascades to the child through the self-referential
//! foreign key.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseTimetables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseTimetables::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseTimetables::Day).text().not_null())
                    .col(
                        ColumnDef::new(CourseTimetables::StartTime)
                            .time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseTimetables::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(CourseTimetables::CourseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseTimetables::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(CourseTimetables::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_timetables_course_id")
                            .from(CourseTimetables::Table, CourseTimetables::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_timetables_parent_id")
                            .from(CourseTimetables::Table, CourseTimetables::ParentId)
                            .to(CourseTimetables::Table, CourseTimetables::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_timetables_slot_unique")
                    .table(CourseTimetables::Table)
                    .col(CourseTimetables::CourseId)
                    .col(CourseTimetables::Day)
                    .col(CourseTimetables::StartTime)
                    .col(CourseTimetables::EndTime)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_timetables_course_id")
                    .table(CourseTimetables::Table)
                    .col(CourseTimetables::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_timetables_parent_id")
                    .table(CourseTimetables::Table)
                    .col(CourseTimetables::ParentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_timetables_slot_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_timetables_course_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_timetables_parent_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CourseTimetables::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CourseTimetables {
    Table,
    Id,
    Day,
    StartTime,
    EndTime,
    CourseId,
    ParentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}
