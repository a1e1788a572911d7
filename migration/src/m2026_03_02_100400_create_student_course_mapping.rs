//! Migration to create the student_course_mapping table.
//!
//! One row per enrollment. The `(student_id, course_id)` unique index is the
//! last-resort duplicate guard for concurrent enrollment requests.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StudentCourseMapping::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentCourseMapping::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentCourseMapping::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCourseMapping::CourseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCourseMapping::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_course_mapping_student_id")
                            .from(
                                StudentCourseMapping::Table,
                                StudentCourseMapping::StudentId,
                            )
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_course_mapping_course_id")
                            .from(StudentCourseMapping::Table, StudentCourseMapping::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_course_mapping_pair_unique")
                    .table(StudentCourseMapping::Table)
                    .col(StudentCourseMapping::StudentId)
                    .col(StudentCourseMapping::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_course_mapping_course_id")
                    .table(StudentCourseMapping::Table)
                    .col(StudentCourseMapping::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_student_course_mapping_pair_unique")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_student_course_mapping_course_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(StudentCourseMapping::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StudentCourseMapping {
    Table,
    Id,
    StudentId,
    CourseId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
}
