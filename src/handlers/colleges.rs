//! # Colleges API Handlers
//!
//! CRUD endpoints for colleges.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorEnvelope};
use crate::handlers::types::{ApiResponse, PageQuery, parse_path_id};
use crate::models::college::Model as CollegeModel;
use crate::repositories::college::{CollegeRepository, CreateCollege, UpdateCollege};
use crate::server::AppState;

/// College as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollegeView {
    /// Opaque college identifier
    pub id: String,
    /// Display name of the college
    pub name: String,
}

impl From<CollegeModel> for CollegeView {
    fn from(model: CollegeModel) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
        }
    }
}

/// Request payload for creating a college.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCollegeDto {
    /// Display name of the college
    #[schema(example = "Northfield College")]
    pub name: String,
}

/// Request payload for updating a college.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCollegeDto {
    /// New display name
    pub name: Option<String>,
}

fn validated_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::validation("College name is required"));
    }
    Ok(name.to_string())
}

/// Create a new college
#[utoipa::path(
    post,
    path = "/colleges",
    request_body = CreateCollegeDto,
    responses(
        (status = 201, description = "College created", body = ApiResponse<CollegeView>),
        (status = 400, description = "Validation failed", body = ErrorEnvelope),
    ),
    tag = "colleges"
)]
pub async fn create_college(
    State(state): State<AppState>,
    Json(request): Json<CreateCollegeDto>,
) -> Result<ApiResponse<CollegeView>, ApiError> {
    let name = validated_name(&request.name)?;

    let repo = CollegeRepository::new(&state.db);
    let college = repo.create(CreateCollege { name }).await?;

    Ok(ApiResponse::created(
        "College created successfully",
        college.into(),
    ))
}

/// List colleges with pagination
#[utoipa::path(
    get,
    path = "/colleges",
    params(PageQuery),
    responses(
        (status = 200, description = "Colleges listed", body = ApiResponse<Vec<CollegeView>>),
        (status = 400, description = "Invalid pagination", body = ErrorEnvelope),
    ),
    tag = "colleges"
)]
pub async fn list_colleges(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<Vec<CollegeView>>, ApiError> {
    let page = query.resolve()?;

    let repo = CollegeRepository::new(&state.db);
    let colleges = repo.list(page).await?;

    Ok(ApiResponse::ok(
        "Colleges fetched successfully",
        colleges.into_iter().map(CollegeView::from).collect(),
    ))
}

/// Get a college by id
#[utoipa::path(
    get,
    path = "/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    responses(
        (status = 200, description = "College fetched", body = ApiResponse<CollegeView>),
        (status = 404, description = "College not found", body = ErrorEnvelope),
    ),
    tag = "colleges"
)]
pub async fn get_college(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CollegeView>, ApiError> {
    let id = parse_path_id(&id, "College")?;

    let repo = CollegeRepository::new(&state.db);
    let college = repo.get(id).await?;

    Ok(ApiResponse::ok(
        "College fetched successfully",
        college.into(),
    ))
}

/// Update a college
#[utoipa::path(
    patch,
    path = "/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    request_body = UpdateCollegeDto,
    responses(
        (status = 200, description = "College updated", body = ApiResponse<CollegeView>),
        (status = 404, description = "College not found", body = ErrorEnvelope),
    ),
    tag = "colleges"
)]
pub async fn update_college(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCollegeDto>,
) -> Result<ApiResponse<CollegeView>, ApiError> {
    let id = parse_path_id(&id, "College")?;
    let name = request.name.as_deref().map(validated_name).transpose()?;

    let repo = CollegeRepository::new(&state.db);
    let college = repo.update(id, UpdateCollege { name }).await?;

    Ok(ApiResponse::ok(
        "College updated successfully",
        college.into(),
    ))
}

/// Delete a college (cascades to its students and courses)
#[utoipa::path(
    delete,
    path = "/colleges/{id}",
    params(("id" = String, Path, description = "College id")),
    responses(
        (status = 200, description = "College deleted", body = ApiResponse<Option<CollegeView>>),
        (status = 404, description = "College not found", body = ErrorEnvelope),
    ),
    tag = "colleges"
)]
pub async fn delete_college(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let id = parse_path_id(&id, "College")?;

    let repo = CollegeRepository::new(&state.db);
    repo.delete(id).await?;

    Ok(ApiResponse::ok(
        "College deleted successfully",
        serde_json::Value::Null,
    ))
}
