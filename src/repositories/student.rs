//! # Student Repository
//!
//! CRUD operations for students. Creation and college reassignment verify
//! the referenced college so foreign-key failures surface as client errors.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use uuid::Uuid;

use super::Page;
use crate::error::ApiError;
use crate::models::College;
use crate::models::student::{
    ActiveModel as StudentActiveModel, Column as StudentColumn, Entity as Student,
    Model as StudentModel,
};

/// Request data for creating a student.
#[derive(Debug, Clone)]
pub struct CreateStudent {
    pub name: String,
    pub college_id: Uuid,
}

/// Partial update for a student.
#[derive(Debug, Clone, Default)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub college_id: Option<Uuid>,
}

/// Repository for student database operations.
pub struct StudentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StudentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateStudent) -> Result<StudentModel, ApiError> {
        self.ensure_college_exists(input.college_id).await?;

        let student = StudentActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            college_id: Set(input.college_id),
            created_at: Set(Utc::now().into()),
        };

        Ok(student.insert(self.db).await?)
    }

    pub async fn list(
        &self,
        college_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<StudentModel>, ApiError> {
        let mut query = Student::find();
        if let Some(college_id) = college_id {
            query = query.filter(StudentColumn::CollegeId.eq(college_id));
        }

        let students = query
            .order_by_asc(StudentColumn::CreatedAt)
            .limit(page.limit)
            .offset(page.skip)
            .all(self.db)
            .await?;

        Ok(students)
    }

    pub async fn get(&self, id: Uuid) -> Result<StudentModel, ApiError> {
        Student::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("Student"))
    }

    pub async fn update(&self, id: Uuid, input: UpdateStudent) -> Result<StudentModel, ApiError> {
        let student = self.get(id).await?;

        if let Some(college_id) = input.college_id
            && college_id != student.college_id
        {
            self.ensure_college_exists(college_id).await?;
        }

        let mut active = student.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(college_id) = input.college_id {
            active.college_id = Set(college_id);
        }

        Ok(active.update(self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let student = self.get(id).await?;
        student.delete(self.db).await?;
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
