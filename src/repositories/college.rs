//! # College Repository
//!
//! CRUD operations for colleges, the root scope of the data model.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::Page;
use crate::error::ApiError;
use crate::models::college::{
    ActiveModel as CollegeActiveModel, Column as CollegeColumn, Entity as College,
    Model as CollegeModel,
};

/// Request data for creating a college.
#[derive(Debug, Clone)]
pub struct CreateCollege {
    pub name: String,
}

/// Partial update for a college.
#[derive(Debug, Clone, Default)]
pub struct UpdateCollege {
    pub name: Option<String>,
}

/// Repository for college database operations.
pub struct CollegeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CollegeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateCollege) -> Result<CollegeModel, ApiError> {
        let college = CollegeActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            created_at: Set(Utc::now().into()),
        };

        Ok(college.insert(self.db).await?)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<CollegeModel>, ApiError> {
        let colleges = College::find()
            .order_by_asc(CollegeColumn::CreatedAt)
            .limit(page.limit)
            .offset(page.skip)
            .all(self.db)
            .await?;

        Ok(colleges)
    }

    pub async fn get(&self, id: Uuid) -> Result<CollegeModel, ApiError> {
        College::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| ApiError::not_found("College"))
    }

    pub async fn update(&self, id: Uuid, input: UpdateCollege) -> Result<CollegeModel, ApiError> {
        let college = self.get(id).await?;

        let mut active = college.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name);
        }

        Ok(active.update(self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let college = self.get(id).await?;
        college.delete(self.db).await?;
        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(College::find_by_id(id).one(self.db).await?.is_some())
    }
}
