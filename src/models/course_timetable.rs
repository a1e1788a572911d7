//! Course timetable entity model
//!
//! One row per weekly recurring interval on a named day. A row with a
//! non-null `parent_id` is the continuation of a midnight-crossing entry
//! and is never surfaced as a top-level timetable; read paths copy its
//! `end_time` back onto the parent.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Course timetable entity, one weekly interval per row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course_timetables")]
pub struct Model {
    /// Opaque identifier minted before the row is persisted (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Exact English day name (Monday .. Sunday)
    pub day: String,

    /// Start of the interval, inclusive
    pub start_time: Time,

    /// End of the interval, exclusive
    pub end_time: Time,

    /// Course this interval belongs to
    pub course_id: Uuid,

    /// Parent row for the continuation half of a midnight-crossing entry
    pub parent_id: Option<Uuid>,

    /// Timestamp when the row was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
