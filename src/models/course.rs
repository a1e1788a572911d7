//! Course entity model
//!
//! Course names are unique within a college (enforced by index).

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Course entity; belongs to one college
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Opaque identifier minted before the row is persisted (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the course, unique within the college
    pub name: String,

    /// Institution-assigned course code
    pub course_code: String,

    /// College the course belongs to
    pub college_id: Uuid,

    /// Timestamp when the course was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::college::Entity",
        from = "Column::CollegeId",
        to = "super::college::Column::Id"
    )]
    College,
    #[sea_orm(has_many = "super::course_timetable::Entity")]
    Timetables,
    #[sea_orm(has_many = "super::student_course_mapping::Entity")]
    Enrollments,
}

impl Related<super::college::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::College.def()
    }
}

impl Related<super::course_timetable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Timetables.def()
    }
}

impl Related<super::student_course_mapping::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
