//! # Course Timetable Repository
//!
//! Write path for weekly timetable entries. Proposed intervals are
//! normalized (midnight-crossing intervals become a parent/child pair),
//! checked for overlap against the course's stored rows with the canonical
//! predicate, and persisted inside one transaction. Read paths return only
//! parentless rows, with the child's end time copied back onto the parent,
//! so callers always see one logical entry per created timetable.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use super::Page;
use crate::error::ApiError;
use crate::models::Course;
use crate::models::course_timetable::{
    ActiveModel as TimetableActiveModel, Column as TimetableColumn, Entity as CourseTimetable,
};
use crate::scheduling::{
    self, CourseSlot, DayOfWeek, NormalizedTimetable, TimeSlot, TimetableRow,
};

/// A validated proposal for one weekly timetable entry.
#[derive(Debug, Clone, Copy)]
pub struct TimetableDraft {
    pub day: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub course_id: Uuid,
}

/// Partial update applied to the logical entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimetablePatch {
    pub day: Option<DayOfWeek>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub course_id: Option<Uuid>,
}

/// Listing filter for timetable entries.
#[derive(Debug, Clone, Default)]
pub struct TimetableFilter {
    pub course_ids: Option<Vec<Uuid>>,
}

/// One logical timetable entry as presented to callers: the parent row with
/// the true end time, regardless of how it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalTimetable {
    pub id: Uuid,
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub course_id: Uuid,
}

/// Load every stored row for the given courses as normalized slots, for
/// overlap checking. Rows listed in `exclude_entry_ids` are skipped (the
/// entry being updated and its child). Rows whose stored day name does not
/// parse are skipped with a warning rather than failing the whole check.
pub(crate) async fn load_course_slots<C>(
    conn: &C,
    course_ids: &[Uuid],
    exclude_entry_ids: &[Uuid],
) -> Result<Vec<CourseSlot>, ApiError>
where
    C: ConnectionTrait,
{
    if course_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        CourseTimetable::find().filter(TimetableColumn::CourseId.is_in(course_ids.iter().copied()));
    if !exclude_entry_ids.is_empty() {
        query = query.filter(TimetableColumn::Id.is_not_in(exclude_entry_ids.iter().copied()));
    }

    let rows = query.all(conn).await?;

    let mut slots = Vec::with_capacity(rows.len());
    for row in rows {
        match DayOfWeek::from_str(&row.day) {
            Ok(day) => slots.push(CourseSlot {
                course_id: row.course_id,
                entry_id: row.id,
                slot: TimeSlot {
                    day,
                    start: row.start_time,
                    end: row.end_time,
                },
            }),
            Err(_) => {
                tracing::warn!(row_id = %row.id, day = %row.day, "skipping timetable row with unrecognized day name");
            }
        }
    }

    Ok(slots)
}

async fn insert_row<C>(
    conn: &C,
    row: &TimetableRow,
    course_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    let model = TimetableActiveModel {
        id: Set(row.id),
        day: Set(row.day.as_str().to_string()),
        start_time: Set(row.start_time),
        end_time: Set(row.end_time),
        course_id: Set(course_id),
        parent_id: Set(row.parent_id),
        created_at: Set(now.into()),
    };
    model.insert(conn).await?;
    Ok(())
}

async fn update_parent<C>(
    conn: &C,
    id: Uuid,
    row: &TimetableRow,
    course_id: Uuid,
) -> Result<(), ApiError>
where
    C: ConnectionTrait,
{
    let active = TimetableActiveModel {
        id: Set(id),
        day: Set(row.day.as_str().to_string()),
        start_time: Set(row.start_time),
        end_time: Set(row.end_time),
        course_id: Set(course_id),
        parent_id: Set(None),
        ..Default::default()
    };
    active.update(conn).await?;
    Ok(())
}

/// Repository for course timetable operations.
pub struct CourseTimetableRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CourseTimetableRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, draft: TimetableDraft) -> Result<LogicalTimetable, ApiError> {
        self.ensure_course_exists(draft.course_id).await?;

        let normalized =
            NormalizedTimetable::from_proposal(draft.day, draft.start_time, draft.end_time);

        let txn = self.db.begin().await?;

        let existing = load_course_slots(&txn, &[draft.course_id], &[]).await?;
        if let Some(conflict) = scheduling::first_conflict(&normalized.slots(), &existing) {
            let conflicting_entry_id = conflict.entry_id;
            txn.rollback().await?;
            return Err(
                ApiError::scheduling_conflict("Overlapping timetable slot").with_details(json!({
                    "course_id": draft.course_id,
                    "conflicting_entry_id": conflicting_entry_id,
                })),
            );
        }

        let now = Utc::now();
        for row in normalized.rows() {
            insert_row(&txn, &row, draft.course_id, now).await?;
        }

        txn.commit().await?;

        Ok(LogicalTimetable {
            id: normalized.entry_id(),
            day: normalized.day().as_str().to_string(),
            start_time: normalized.logical_start(),
            end_time: normalized.logical_end(),
            course_id: draft.course_id,
        })
    }

    pub async fn list(
        &self,
        filter: TimetableFilter,
        page: Page,
    ) -> Result<Vec<LogicalTimetable>, ApiError> {
        let mut query = CourseTimetable::find().filter(TimetableColumn::ParentId.is_null());
        if let Some(course_ids) = filter.course_ids {
            query = query.filter(TimetableColumn::CourseId.is_in(course_ids));
        }

        let parents = query
            .order_by_asc(TimetableColumn::Day)
            .order_by_asc(TimetableColumn::StartTime)
            .limit(page.limit)
            .offset(page.skip)
            .all(self.db)
            .await?;

        if parents.is_empty() {
            return Ok(Vec::new());
        }

        let parent_ids: Vec<Uuid> = parents.iter().map(|parent| parent.id).collect();
        let children = CourseTimetable::find()
            .filter(TimetableColumn::ParentId.is_in(parent_ids))
            .all(self.db)
            .await?;

        let mut end_overrides: HashMap<Uuid, NaiveTime> = children
            .into_iter()
            .filter_map(|child| child.parent_id.map(|parent_id| (parent_id, child.end_time)))
            .collect();

        Ok(parents
            .into_iter()
            .map(|parent| {
                let end_time = end_overrides.remove(&parent.id).unwrap_or(parent.end_time);
                LogicalTimetable {
                    id: parent.id,
                    day: parent.day,
                    start_time: parent.start_time,
                    end_time,
                    course_id: parent.course_id,
                }
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<LogicalTimetable, ApiError> {
        let parent = CourseTimetable::find_by_id(id)
            .one(self.db)
            .await?
            .filter(|row| row.parent_id.is_none())
            .ok_or_else(|| ApiError::not_found("Course timetable"))?;

        let child = CourseTimetable::find()
            .filter(TimetableColumn::ParentId.eq(id))
            .one(self.db)
            .await?;

        let end_time = child.map(|child| child.end_time).unwrap_or(parent.end_time);

        Ok(LogicalTimetable {
            id: parent.id,
            day: parent.day,
            start_time: parent.start_time,
            end_time,
            course_id: parent.course_id,
        })
    }

    pub async fn update(&self, id: Uuid, patch: TimetablePatch) -> Result<LogicalTimetable, ApiError> {
        let current = self.get(id).await?;
        let current_day = DayOfWeek::from_str(&current.day).map_err(|_| ApiError::StoreFailure {
            message: "stored day name is not a valid day".to_string(),
        })?;

        let day = patch.day.unwrap_or(current_day);
        let start_time = patch.start_time.unwrap_or(current.start_time);
        let end_time = patch.end_time.unwrap_or(current.end_time);
        let course_id = patch.course_id.unwrap_or(current.course_id);

        if course_id != current.course_id {
            self.ensure_course_exists(course_id).await?;
        }

        let normalized = NormalizedTimetable::from_proposal(day, start_time, end_time);

        let txn = self.db.begin().await?;

        let mut exclude = vec![id];
        let child_ids: Vec<Uuid> = CourseTimetable::find()
            .filter(TimetableColumn::ParentId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|child| child.id)
            .collect();
        exclude.extend(child_ids);

        let existing = load_course_slots(&txn, &[course_id], &exclude).await?;
        if let Some(conflict) = scheduling::first_conflict(&normalized.slots(), &existing) {
            let conflicting_entry_id = conflict.entry_id;
            txn.rollback().await?;
            return Err(
                ApiError::scheduling_conflict("Overlapping timetable slot").with_details(json!({
                    "course_id": course_id,
                    "conflicting_entry_id": conflicting_entry_id,
                })),
            );
        }

        // The stored representation is rewritten around the logical entry:
        // the parent row keeps its id, child rows are replaced.
        CourseTimetable::delete_many()
            .filter(TimetableColumn::ParentId.eq(id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        match &normalized {
            NormalizedTimetable::Simple(row) => {
                update_parent(&txn, id, row, course_id).await?;
            }
            NormalizedTimetable::Split { parent, child } => {
                update_parent(&txn, id, parent, course_id).await?;
                let child_row = TimetableRow {
                    parent_id: Some(id),
                    ..*child
                };
                insert_row(&txn, &child_row, course_id, now).await?;
            }
        }

        txn.commit().await?;

        Ok(LogicalTimetable {
            id,
            day: day.as_str().to_string(),
            start_time,
            end_time,
            course_id,
        })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let parent = CourseTimetable::find_by_id(id)
            .one(self.db)
            .await?
            .filter(|row| row.parent_id.is_none())
            .ok_or_else(|| ApiError::not_found("Course timetable"))?;

        // The child row follows through the parent_id cascade.
        parent.delete(self.db).await?;
        Ok(())
    }

    async fn ensure_course_exists(&self, course_id: Uuid) -> Result<(), ApiError> {
        let exists = Course::find_by_id(course_id).one(self.db).await?.is_some();

        if !exists {
            return Err(ApiError::invalid_reference("Invalid course id")
                .with_details(json!({ "course_id": course_id })));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::college::{CollegeRepository, CreateCollege};
    use crate::repositories::course::{CourseRepository, CreateCourse};
    use crate::scheduling::parse_time;
    use migration::MigratorTrait;
    use sea_orm::{Database, PaginatorTrait};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_course(db: &DatabaseConnection, name: &str) -> Uuid {
        let college = CollegeRepository::new(db)
            .create(CreateCollege {
                name: format!("{name} College"),
            })
            .await
            .unwrap();
        CourseRepository::new(db)
            .create(CreateCourse {
                name: name.to_string(),
                course_code: format!("{name}-101"),
                college_id: college.id,
            })
            .await
            .unwrap()
            .id
    }

    fn t(value: &str) -> NaiveTime {
        parse_time(value).unwrap()
    }

    async fn stored_rows(db: &DatabaseConnection, course_id: Uuid) -> u64 {
        CourseTimetable::find()
            .filter(TimetableColumn::CourseId.eq(course_id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_within_day_stores_one_row() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Algebra").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t("09:00:00"),
                end_time: t("10:00:00"),
                course_id,
            })
            .await
            .unwrap();

        assert_eq!(entry.day, "Monday");
        assert_eq!(entry.start_time, t("09:00:00"));
        assert_eq!(entry.end_time, t("10:00:00"));
        assert_eq!(stored_rows(&db, course_id).await, 1);
    }

    #[tokio::test]
    async fn create_rejects_unknown_course() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);

        let err = repo
            .create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t("09:00:00"),
                end_time: t("10:00:00"),
                course_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_REFERENCE");
    }

    #[tokio::test]
    async fn midnight_crossing_entry_splits_and_reads_as_one() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Astronomy").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Friday,
                start_time: t("22:00:00"),
                end_time: t("01:30:00"),
                course_id,
            })
            .await
            .unwrap();

        // Two stored rows, one logical entry with the original end time.
        assert_eq!(stored_rows(&db, course_id).await, 2);
        assert_eq!(entry.day, "Friday");
        assert_eq!(entry.end_time, t("01:30:00"));

        let fetched = repo.get(entry.id).await.unwrap();
        assert_eq!(fetched.start_time, t("22:00:00"));
        assert_eq!(fetched.end_time, t("01:30:00"));

        let listed = repo.list(TimetableFilter::default(), Page::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].end_time, t("01:30:00"));
    }

    #[tokio::test]
    async fn child_rows_are_not_addressable() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Night Lab").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t("23:00:00"),
                end_time: t("01:00:00"),
                course_id,
            })
            .await
            .unwrap();

        let child = CourseTimetable::find()
            .filter(TimetableColumn::ParentId.eq(entry.id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        let err = repo.get(child.id).await.unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");

        let err = repo.delete(child.id).await.unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn overlapping_slot_within_course_is_rejected() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Biology").await;

        repo.create(TimetableDraft {
            day: DayOfWeek::Monday,
            start_time: t("09:00:00"),
            end_time: t("10:00:00"),
            course_id,
        })
        .await
        .unwrap();

        let err = repo
            .create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t("09:30:00"),
                end_time: t("10:30:00"),
                course_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SCHEDULING_CONFLICT");
        assert_eq!(stored_rows(&db, course_id).await, 1);
    }

    #[tokio::test]
    async fn touching_slots_are_allowed() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Chemistry").await;

        repo.create(TimetableDraft {
            day: DayOfWeek::Monday,
            start_time: t("09:00:00"),
            end_time: t("10:00:00"),
            course_id,
        })
        .await
        .unwrap();

        repo.create(TimetableDraft {
            day: DayOfWeek::Monday,
            start_time: t("10:00:00"),
            end_time: t("11:00:00"),
            course_id,
        })
        .await
        .unwrap();

        assert_eq!(stored_rows(&db, course_id).await, 2);
    }

    #[tokio::test]
    async fn split_child_segment_participates_in_overlap_check() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Observatory").await;

        // Tuesday early morning slot already present.
        repo.create(TimetableDraft {
            day: DayOfWeek::Tuesday,
            start_time: t("00:30:00"),
            end_time: t("01:30:00"),
            course_id,
        })
        .await
        .unwrap();

        // Monday 23:00 -> 01:00 splits into a Tuesday 00:00-01:00 child,
        // which collides with the existing Tuesday slot.
        let err = repo
            .create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t("23:00:00"),
                end_time: t("01:00:00"),
                course_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "SCHEDULING_CONFLICT");
        assert_eq!(stored_rows(&db, course_id).await, 1);
    }

    #[tokio::test]
    async fn update_can_unsplit_an_entry() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Drama").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Saturday,
                start_time: t("22:00:00"),
                end_time: t("02:00:00"),
                course_id,
            })
            .await
            .unwrap();
        assert_eq!(stored_rows(&db, course_id).await, 2);

        let updated = repo
            .update(
                entry.id,
                TimetablePatch {
                    start_time: Some(t("18:00:00")),
                    end_time: Some(t("20:00:00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.start_time, t("18:00:00"));
        assert_eq!(updated.end_time, t("20:00:00"));
        assert_eq!(stored_rows(&db, course_id).await, 1);
    }

    #[tokio::test]
    async fn update_can_introduce_a_split() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Evening Studio").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Wednesday,
                start_time: t("18:00:00"),
                end_time: t("20:00:00"),
                course_id,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                entry.id,
                TimetablePatch {
                    start_time: Some(t("23:00:00")),
                    end_time: Some(t("01:00:00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.end_time, t("01:00:00"));
        assert_eq!(stored_rows(&db, course_id).await, 2);

        let fetched = repo.get(entry.id).await.unwrap();
        assert_eq!(fetched.day, "Wednesday");
        assert_eq!(fetched.end_time, t("01:00:00"));
    }

    #[tokio::test]
    async fn update_does_not_conflict_with_itself() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Economics").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Thursday,
                start_time: t("09:00:00"),
                end_time: t("10:00:00"),
                course_id,
            })
            .await
            .unwrap();

        // Shifting the same entry into a window that overlaps its old
        // position must not be treated as a conflict.
        let updated = repo
            .update(
                entry.id,
                TimetablePatch {
                    start_time: Some(t("09:30:00")),
                    end_time: Some(t("10:30:00")),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.start_time, t("09:30:00"));
    }

    #[tokio::test]
    async fn delete_removes_parent_and_child() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let course_id = seed_course(&db, "Film").await;

        let entry = repo
            .create(TimetableDraft {
                day: DayOfWeek::Sunday,
                start_time: t("23:00:00"),
                end_time: t("01:00:00"),
                course_id,
            })
            .await
            .unwrap();
        assert_eq!(stored_rows(&db, course_id).await, 2);

        repo.delete(entry.id).await.unwrap();
        assert_eq!(stored_rows(&db, course_id).await, 0);
    }

    #[tokio::test]
    async fn list_filters_by_course_ids() {
        let db = setup_db().await;
        let repo = CourseTimetableRepository::new(&db);
        let first = seed_course(&db, "Geometry").await;
        let second = seed_course(&db, "History").await;

        for (course_id, start, end) in [
            (first, "09:00:00", "10:00:00"),
            (second, "09:00:00", "10:00:00"),
        ] {
            repo.create(TimetableDraft {
                day: DayOfWeek::Monday,
                start_time: t(start),
                end_time: t(end),
                course_id,
            })
            .await
            .unwrap();
        }

        let filtered = repo
            .list(
                TimetableFilter {
                    course_ids: Some(vec![first]),
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].course_id, first);
    }
}
