//! # Enrollment Orchestrator
//!
//! Commits student-course mappings through a staged state machine:
//! duplicate check, course existence, timetable completeness, college
//! membership, cross-course overlap, then the commit. Stages run strictly
//! in order and the first failure aborts the whole request; every read and
//! the insert happen inside one transaction so a concurrent enrollment for
//! the same student either sees this request's committed rows or is
//! serialized behind it. On Postgres the student row is locked `FOR UPDATE`
//! for the duration; SQLite serializes writers on its own and does not
//! accept the clause. The `(student_id, course_id)` unique constraint plus
//! `ON CONFLICT DO NOTHING` make the commit idempotent per pair either way.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
use crate::models::student::{Entity as Student, Model as StudentModel};
use crate::models::student_course_mapping::{
    ActiveModel as MappingActiveModel, Column as MappingColumn, Entity as StudentCourseMapping,
};
use crate::repositories::course_timetable::load_course_slots;
use crate::scheduling;

/// One enrollment request: a student and the set of courses to add.
#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    pub student_id: Uuid,
    pub course_ids: Vec<Uuid>,
}

/// Successful enrollment result.
#[derive(Debug, Clone)]
pub struct EnrollmentOutcome {
    pub student_id: Uuid,
    pub enrolled_course_ids: Vec<Uuid>,
}

/// Read model for `GET /student-course-mapping/:student_id`.
#[derive(Debug, Clone)]
pub struct StudentEnrollments {
    pub student: StudentModel,
    pub courses: Vec<CourseModel>,
}

/// Run the staged enrollment state machine and commit the mapping rows.
pub async fn enroll(
    db: &DatabaseConnection,
    request: EnrollmentRequest,
) -> Result<EnrollmentOutcome, ApiError> {
    let course_ids = dedupe(&request.course_ids);
    if course_ids.is_empty() {
        return Err(ApiError::validation("course_ids must not be empty"));
    }

    let txn = db.begin().await?;

    let mut student_query = Student::find_by_id(request.student_id);
    if db.get_database_backend() == DatabaseBackend::Postgres {
        student_query = student_query.lock(LockType::Update);
    }
    let student = student_query
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Student"))?;

    let existing_course_ids: HashSet<Uuid> = StudentCourseMapping::find()
        .filter(MappingColumn::StudentId.eq(student.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|mapping| mapping.course_id)
        .collect();

    // Stage 1: none of the requested courses may already be enrolled.
    let already_enrolled: Vec<Uuid> = course_ids
        .iter()
        .copied()
        .filter(|id| existing_course_ids.contains(id))
        .collect();
    if !already_enrolled.is_empty() {
        return Err(ApiError::duplicate_enrollment(
            "Student is already enrolled in some of the requested courses",
        )
        .with_details(json!({ "course_ids": already_enrolled })));
    }

    // Stage 2: every requested course id must resolve. Courses already
    // enrolled are loaded alongside for the later stages.
    let involved_ids: Vec<Uuid> = course_ids
        .iter()
        .copied()
        .chain(existing_course_ids.iter().copied())
        .collect();
    let courses = Course::find()
        .filter(CourseColumn::Id.is_in(involved_ids.clone()))
        .all(&txn)
        .await?;
    let courses_by_id: HashMap<Uuid, &CourseModel> =
        courses.iter().map(|course| (course.id, course)).collect();

    let missing: Vec<Uuid> = course_ids
        .iter()
        .copied()
        .filter(|id| !courses_by_id.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::invalid_reference("One or more course ids are invalid")
            .with_details(json!({ "course_ids": missing })));
    }

    // Stage 3: every requested course needs at least one timetable entry.
    let slots = load_course_slots(&txn, &involved_ids, &[]).await?;
    let with_timetable: HashSet<Uuid> = slots.iter().map(|slot| slot.course_id).collect();
    let missing_timetables: Vec<&CourseModel> = course_ids
        .iter()
        .copied()
        .filter(|id| !with_timetable.contains(id))
        .filter_map(|id| courses_by_id.get(&id).copied())
        .collect();
    if !missing_timetables.is_empty() {
        let names: Vec<&str> = missing_timetables
            .iter()
            .map(|course| course.name.as_str())
            .collect();
        return Err(ApiError::incomplete_prerequisite(format!(
            "These courses don't have timetables. Deselect and try again: {}",
            names.join(", ")
        ))
        .with_details(json!({
            "course_ids": missing_timetables.iter().map(|course| course.id).collect::<Vec<_>>(),
        })));
    }

    // Stage 4: every requested course must belong to the student's college.
    let foreign: Vec<&CourseModel> = course_ids
        .iter()
        .filter_map(|id| courses_by_id.get(id).copied())
        .filter(|course| course.college_id != student.college_id)
        .collect();
    if !foreign.is_empty() {
        return Err(ApiError::incomplete_prerequisite(
            "All courses must belong to the student's college",
        )
        .with_details(json!({
            "course_ids": foreign.iter().map(|course| course.id).collect::<Vec<_>>(),
        })));
    }

    // Stage 5: no slot of a newly requested course may overlap a slot of
    // any other involved course on the same day.
    let requested: HashSet<Uuid> = course_ids.iter().copied().collect();
    let candidate_slots: Vec<scheduling::CourseSlot> = slots
        .iter()
        .copied()
        .filter(|slot| requested.contains(&slot.course_id))
        .collect();
    if let Some((candidate, held)) = scheduling::first_cross_course_conflict(&candidate_slots, &slots)
    {
        let course_name = |id: Uuid| {
            courses_by_id
                .get(&id)
                .map(|course| course.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        return Err(ApiError::scheduling_conflict(
            "Course timetable conflicts with existing enrolled courses",
        )
        .with_details(json!({
            "courses": [course_name(candidate.course_id), course_name(held.course_id)],
        })));
    }

    // Stage 6: commit. `ON CONFLICT DO NOTHING` keeps a concurrent
    // duplicate of the same pair from failing the whole request.
    let now = Utc::now();
    let mappings: Vec<MappingActiveModel> = course_ids
        .iter()
        .map(|course_id| MappingActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student.id),
            course_id: Set(*course_id),
            created_at: Set(now.into()),
        })
        .collect();

    StudentCourseMapping::insert_many(mappings)
        .on_conflict(
            OnConflict::columns([MappingColumn::StudentId, MappingColumn::CourseId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        student_id = %student.id,
        courses = course_ids.len(),
        "enrolled student into courses"
    );

    Ok(EnrollmentOutcome {
        student_id: student.id,
        enrolled_course_ids: course_ids,
    })
}

/// Load a student and the courses they are enrolled in.
pub async fn student_enrollments(
    db: &DatabaseConnection,
    student_id: Uuid,
) -> Result<StudentEnrollments, ApiError> {
    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Student"))?;

    let course_ids: Vec<Uuid> = StudentCourseMapping::find()
        .filter(MappingColumn::StudentId.eq(student.id))
        .all(db)
        .await?
        .into_iter()
        .map(|mapping| mapping.course_id)
        .collect();

    let courses = if course_ids.is_empty() {
        Vec::new()
    } else {
        Course::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(db)
            .await?
    };

    Ok(StudentEnrollments { student, courses })
}

fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::college::{CollegeRepository, CreateCollege};
    use crate::repositories::course::{CourseRepository, CreateCourse};
    use crate::repositories::course_timetable::{CourseTimetableRepository, TimetableDraft};
    use crate::repositories::student::{CreateStudent, StudentRepository};
    use crate::scheduling::{DayOfWeek, parse_time};
    use migration::MigratorTrait;
    use sea_orm::{Database, PaginatorTrait};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_college(db: &DatabaseConnection, name: &str) -> Uuid {
        CollegeRepository::new(db)
            .create(CreateCollege {
                name: name.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_student(db: &DatabaseConnection, name: &str, college_id: Uuid) -> Uuid {
        StudentRepository::new(db)
            .create(CreateStudent {
                name: name.to_string(),
                college_id,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_course(db: &DatabaseConnection, name: &str, college_id: Uuid) -> Uuid {
        CourseRepository::new(db)
            .create(CreateCourse {
                name: name.to_string(),
                course_code: format!("{name}-101"),
                college_id,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_slot(db: &DatabaseConnection, course_id: Uuid, day: DayOfWeek, start: &str, end: &str) {
        CourseTimetableRepository::new(db)
            .create(TimetableDraft {
                day,
                start_time: parse_time(start).unwrap(),
                end_time: parse_time(end).unwrap(),
                course_id,
            })
            .await
            .unwrap();
    }

    async fn mapping_count(db: &DatabaseConnection, student_id: Uuid) -> u64 {
        StudentCourseMapping::find()
            .filter(MappingColumn::StudentId.eq(student_id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn enrolls_into_compatible_courses() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        let y = seed_course(&db, "Y", college).await;
        seed_slot(&db, x, DayOfWeek::Monday, "09:00:00", "10:00:00").await;
        seed_slot(&db, y, DayOfWeek::Monday, "10:00:00", "11:00:00").await;

        let outcome = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x, y],
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.enrolled_course_ids.len(), 2);
        assert_eq!(mapping_count(&db, student).await, 2);

        let view = student_enrollments(&db, student).await.unwrap();
        assert_eq!(view.student.id, student);
        assert_eq!(view.courses.len(), 2);
    }

    #[tokio::test]
    async fn overlapping_courses_commit_nothing() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        let y = seed_course(&db, "Y", college).await;
        seed_slot(&db, x, DayOfWeek::Monday, "09:00:00", "10:00:00").await;
        seed_slot(&db, y, DayOfWeek::Monday, "09:30:00", "10:30:00").await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x, y],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "SCHEDULING_CONFLICT");
        assert_eq!(mapping_count(&db, student).await, 0);
    }

    #[tokio::test]
    async fn conflict_with_already_enrolled_course_is_rejected() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        let y = seed_course(&db, "Y", college).await;
        seed_slot(&db, x, DayOfWeek::Tuesday, "09:00:00", "11:00:00").await;
        seed_slot(&db, y, DayOfWeek::Tuesday, "10:00:00", "12:00:00").await;

        enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x],
            },
        )
        .await
        .unwrap();

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![y],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "SCHEDULING_CONFLICT");
        assert_eq!(mapping_count(&db, student).await, 1);
    }

    #[tokio::test]
    async fn repeated_enrollment_is_flagged_and_never_duplicates_rows() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        seed_slot(&db, x, DayOfWeek::Friday, "09:00:00", "10:00:00").await;

        let request = EnrollmentRequest {
            student_id: student,
            course_ids: vec![x],
        };

        enroll(&db, request.clone()).await.unwrap();
        assert_eq!(mapping_count(&db, student).await, 1);

        let err = enroll(&db, request).await.unwrap_err();
        assert_eq!(err.kind(), "DUPLICATE_ENROLLMENT");
        assert_eq!(mapping_count(&db, student).await, 1);
    }

    #[tokio::test]
    async fn duplicate_ids_within_one_request_collapse() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        seed_slot(&db, x, DayOfWeek::Friday, "09:00:00", "10:00:00").await;

        let outcome = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x, x, x],
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.enrolled_course_ids, vec![x]);
        assert_eq!(mapping_count(&db, student).await, 1);
    }

    #[tokio::test]
    async fn unknown_course_ids_abort_before_any_write() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "X", college).await;
        seed_slot(&db, x, DayOfWeek::Monday, "09:00:00", "10:00:00").await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x, Uuid::new_v4()],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "INVALID_REFERENCE");
        assert_eq!(mapping_count(&db, student).await, 0);
    }

    #[tokio::test]
    async fn course_without_timetable_is_named_in_the_error() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let x = seed_course(&db, "Bare Course", college).await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "INCOMPLETE_ENROLLMENT_PREREQUISITE");
        assert!(err.to_string().contains("Bare Course"));
        assert_eq!(mapping_count(&db, student).await, 0);
    }

    #[tokio::test]
    async fn cross_college_course_is_rejected_even_without_conflicts() {
        let db = setup_db().await;
        let home = seed_college(&db, "Home").await;
        let away = seed_college(&db, "Away").await;
        let student = seed_student(&db, "S", home).await;
        let x = seed_course(&db, "X", away).await;
        seed_slot(&db, x, DayOfWeek::Monday, "09:00:00", "10:00:00").await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![x],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "INCOMPLETE_ENROLLMENT_PREREQUISITE");
        assert_eq!(mapping_count(&db, student).await, 0);
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let x = seed_course(&db, "X", college).await;
        seed_slot(&db, x, DayOfWeek::Monday, "09:00:00", "10:00:00").await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: Uuid::new_v4(),
                course_ids: vec![x],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn empty_course_list_is_a_validation_failure() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn split_timetables_conflict_through_their_child_segment() {
        let db = setup_db().await;
        let college = seed_college(&db, "C1").await;
        let student = seed_student(&db, "S", college).await;
        let night = seed_course(&db, "Night Course", college).await;
        let morning = seed_course(&db, "Early Course", college).await;
        // Night course runs Monday 23:00 -> Tuesday 01:00.
        seed_slot(&db, night, DayOfWeek::Monday, "23:00:00", "01:00:00").await;
        // Early course occupies Tuesday 00:30-01:30, colliding with the
        // continuation segment of the night course.
        seed_slot(&db, morning, DayOfWeek::Tuesday, "00:30:00", "01:30:00").await;

        let err = enroll(
            &db,
            EnrollmentRequest {
                student_id: student,
                course_ids: vec![night, morning],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "SCHEDULING_CONFLICT");
        assert_eq!(mapping_count(&db, student).await, 0);
    }
}
