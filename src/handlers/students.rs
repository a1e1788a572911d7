//! # Students API Handlers
//!
//! CRUD endpoints for students.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorEnvelope};
use crate::handlers::types::{ApiResponse, PageQuery, parse_body_ref, parse_path_id};
use crate::models::student::Model as StudentModel;
use crate::repositories::student::{CreateStudent, StudentRepository, UpdateStudent};
use crate::server::AppState;

/// Student as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentView {
    /// Opaque student identifier
    pub id: String,
    /// Display name of the student
    pub name: String,
    /// College the student belongs to
    pub college_id: String,
}

impl From<StudentModel> for StudentView {
    fn from(model: StudentModel) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            college_id: model.college_id.to_string(),
        }
    }
}

/// Request payload for creating a student.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStudentDto {
    /// Display name of the student
    #[schema(example = "Priya Raman")]
    pub name: String,
    /// College the student belongs to
    pub college_id: String,
}

/// Request payload for updating a student.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStudentDto {
    /// New display name
    pub name: Option<String>,
    /// New college id
    pub college_id: Option<String>,
}

/// Query parameters for listing students.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListStudentsQuery {
    /// Maximum number of records to return (default: 20)
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0)
    pub skip: Option<i64>,
    /// Restrict to one college
    pub college_id: Option<String>,
}

fn validated_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Student name is required"));
    }
    Ok(name.to_string())
}

/// Create a new student
#[utoipa::path(
    post,
    path = "/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = ApiResponse<StudentView>),
        (status = 400, description = "Validation failed or invalid college id", body = ErrorEnvelope),
    ),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    Json(request): Json<CreateStudentDto>,
) -> Result<ApiResponse<StudentView>, ApiError> {
    let name = validated_name(&request.name)?;
    let college_id = parse_body_ref(&request.college_id, "Invalid college id")?;

    let repo = StudentRepository::new(&state.db);
    let student = repo.create(CreateStudent { name, college_id }).await?;

    Ok(ApiResponse::created(
        "Student created successfully",
        student.into(),
    ))
}

/// List students with pagination and optional college filter
#[utoipa::path(
    get,
    path = "/students",
    params(ListStudentsQuery),
    responses(
        (status = 200, description = "Students listed", body = ApiResponse<Vec<StudentView>>),
        (status = 400, description = "Invalid pagination", body = ErrorEnvelope),
    ),
    tag = "students"
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<ListStudentsQuery>,
) -> Result<ApiResponse<Vec<StudentView>>, ApiError> {
    let page = PageQuery {
        limit: query.limit,
        skip: query.skip,
    }
    .resolve()?;

    let college_id = query
        .college_id
        .as_deref()
        .map(|raw| parse_body_ref(raw, "Invalid college id"))
        .transpose()?;

    let repo = StudentRepository::new(&state.db);
    let students = repo.list(college_id, page).await?;

    Ok(ApiResponse::ok(
        "Students fetched successfully",
        students.into_iter().map(StudentView::from).collect(),
    ))
}

/// Get a student by id
#[utoipa::path(
    get,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student fetched", body = ApiResponse<StudentView>),
        (status = 404, description = "Student not found", body = ErrorEnvelope),
    ),
    tag = "students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<StudentView>, ApiError> {
    let id = parse_path_id(&id, "Student")?;

    let repo = StudentRepository::new(&state.db);
    let student = repo.get(id).await?;

    Ok(ApiResponse::ok(
        "Student fetched successfully",
        student.into(),
    ))
}

/// Update a student
#[utoipa::path(
    patch,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = ApiResponse<StudentView>),
        (status = 404, description = "Student not found", body = ErrorEnvelope),
    ),
    tag = "students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStudentDto>,
) -> Result<ApiResponse<StudentView>, ApiError> {
    let id = parse_path_id(&id, "Student")?;
    let name = request.name.as_deref().map(validated_name).transpose()?;
    let college_id = request
        .college_id
        .as_deref()
        .map(|raw| parse_body_ref(raw, "Invalid college id"))
        .transpose()?;

    let repo = StudentRepository::new(&state.db);
    let student = repo.update(id, UpdateStudent { name, college_id }).await?;

    Ok(ApiResponse::ok(
        "Student updated successfully",
        student.into(),
    ))
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted", body = ApiResponse<Option<StudentView>>),
        (status = 404, description = "Student not found", body = ErrorEnvelope),
    ),
    tag = "students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let id = parse_path_id(&id, "Student")?;

    let repo = StudentRepository::new(&state.db);
    repo.delete(id).await?;

    Ok(ApiResponse::ok(
        "Student deleted successfully",
        serde_json::Value::Null,
    ))
}
