//! # Course Repository
//!
//! CRUD operations for courses. `(name, college_id)` is unique; the unique
//! index violation is surfaced as a validation failure rather than a raw
//! driver error.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use super::Page;
use crate::error::{ApiError, is_unique_violation};
use crate::models::College;
use crate::models::course::{
    ActiveModel as CourseActiveModel, Column as CourseColumn, Entity as Course,
    Model as CourseModel,
};

/// Request data for creating a course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub name: String,
    pub course_code: String,
    pub college_id: Uuid,
}

/// Partial update for a course.
#[derive(Debug, Clone, Default)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub course_code: Option<String>,
    pub college_id: Option<Uuid>,
}

/// Listing filter for courses.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub college_id: Option<Uuid>,
    pub course_ids: Option<Vec<Uuid>>,
}

/// Repository for course database operations.
pub struct CourseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CourseRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateCourse) -> Result<CourseModel, ApiError> {
        self.ensure_college_exists(input.college_id).await?;

        let course = CourseActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            course_code: Set(input.course_code),
            college_id: Set(input.college_id),
            created_at: Set(Utc::now().into()),
        };

        course.insert(self.db).await.map_err(map_course_write_err)
    }

    pub async fn list(&self, filter: CourseFilter, page: Page) -> Result<Vec<CourseModel>, ApiError> {
        let mut query = Course::find();
        if let Some(college_id) = filter.college_id {
            query = query.filter(CourseColumn::CollegeId.eq(college_id));
        }
        if let Some(course_ids) = filter.course_ids {
            query = query.filter(CourseColumn::Id.is_in(course_ids));
        }

        let courses = query
            .order_by_asc(CourseColumn::CreatedAt)
            .limit(page.limit)
            .offset(page.skip)
            .all(self.db)
            .await?;

        Ok(courses)
    }

    pub async fn get(&self, id: Uuid) -> Result<CourseModel, ApiError> {
        Course::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Course"))
    }

    pub async fn update(&self, id: Uuid, input: UpdateCourse) -> Result<CourseModel, ApiError> {
        let course = self.get(id).await?;

        if let Some(college_id) = input.college_id
            && college_id != course.college_id
        {
            self.ensure_college_exists(college_id).await?;
        }

        let mut active = course.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(course_code) = input.course_code {
            active.course_code = Set(course_code);
        }
        if let Some(college_id) = input.college_id {
            active.college_id = Set(college_id);
        }

        active.update(self.db).await.map_err(map_course_write_err)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let course = self.get(id).await?;
        course.delete(self.db).await?;
        Ok(())
    }

    async fn ensure_college_exists(&self, college_id: Uuid) -> Result<(), ApiError> {
        let exists = College::find_by_id(college_id)
            .one(self.db)
            .await?
            .is_some();

        if !exists {
            return Err(ApiError::invalid_reference("Invalid college id")
                .with_details(json!({ "college_id": college_id })));
        }

        Ok(())
    }
}

fn map_course_write_err(err: sea_orm::DbErr) -> ApiError {
    if is_unique_violation(&err) {
        return ApiError::validation("A course with this name already exists in this college");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::college::{CollegeRepository, CreateCollege};
    use migration::MigratorTrait;
    use sea_orm::Database;

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

    #[tokio::test]
    async fn create_requires_existing_college() {
        let db = setup_db().await;
        let repo = CourseRepository::new(&db);

        let err = repo
            .create(CreateCourse {
                name: "Algebra".to_string(),
                course_code: "MATH101".to_string(),
                college_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "INVALID_REFERENCE");
    }

    #[tokio::test]
    async fn duplicate_name_in_same_college_is_rejected() {
        let db = setup_db().await;
        let repo = CourseRepository::new(&db);
        let college_id = seed_college(&db, "Uptown").await;

        repo.create(CreateCourse {
            name: "Algebra".to_string(),
            course_code: "MATH101".to_string(),
            college_id,
        })
        .await
        .unwrap();

        let err = repo
            .create(CreateCourse {
                name: "Algebra".to_string(),
                course_code: "MATH102".to_string(),
                college_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION_FAILED");

        // Same name in a different college is fine.
        let other_college = seed_college(&db, "Downtown").await;
        repo.create(CreateCourse {
            name: "Algebra".to_string(),
            course_code: "MATH101".to_string(),
            college_id: other_college,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_college_and_ids() {
        let db = setup_db().await;
        let repo = CourseRepository::new(&db);
        let college_id = seed_college(&db, "Filterton").await;

        let mut ids = Vec::new();
        for (name, code) in [("Algebra", "M101"), ("Biology", "B101"), ("Chemistry", "C101")] {
            let course = repo
                .create(CreateCourse {
                    name: name.to_string(),
                    course_code: code.to_string(),
                    college_id,
                })
                .await
                .unwrap();
            ids.push(course.id);
        }

        let by_college = repo
            .list(
                CourseFilter {
                    college_id: Some(college_id),
                    course_ids: None,
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_college.len(), 3);

        let by_ids = repo
            .list(
                CourseFilter {
                    college_id: None,
                    course_ids: Some(vec![ids[0], ids[2]]),
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_ids.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let db = setup_db().await;
        let repo = CourseRepository::new(&db);
        let college_id = seed_college(&db, "Roundtrip").await;

        let course = repo
            .create(CreateCourse {
                name: "Drawing".to_string(),
                course_code: "ART1".to_string(),
                college_id,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                course.id,
                UpdateCourse {
                    course_code: Some("ART100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.course_code, "ART100");
        assert_eq!(updated.name, "Drawing");

        repo.delete(course.id).await.unwrap();
        let err = repo.get(course.id).await.unwrap_err();
        assert_eq!(err.kind(), "NOT_FOUND");
    }
}
