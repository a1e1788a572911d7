//! # Courses API Handlers
//!
//! CRUD endpoints for courses.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorEnvelope};
use crate::handlers::types::{ApiResponse, PageQuery, parse_body_ref, parse_id_list, parse_path_id};
use crate::models::course::Model as CourseModel;
use crate::repositories::course::{CourseFilter, CourseRepository, CreateCourse, UpdateCourse};
use crate::server::AppState;

/// Course as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseView {
    /// Opaque course identifier
    pub id: String,
    /// Display name of the course
    pub name: String,
    /// Institution-assigned course code
    pub course_code: String,
    /// College the course belongs to
    pub college_id: String,
}

impl From<CourseModel> for CourseView {
    fn from(model: CourseModel) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            course_code: model.course_code,
            college_id: model.college_id.to_string(),
        }
    }
}

/// Request payload for creating a course.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCourseDto {
    /// Display name, unique within the college
    #[schema(example = "Linear Algebra")]
    pub name: String,
    /// Institution-assigned course code
    #[schema(example = "MATH201")]
    pub course_code: String,
    /// College the course belongs to
    pub college_id: String,
}

/// Request payload for updating a course.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCourseDto {
    /// New display name
    pub name: Option<String>,
    /// New course code
    pub course_code: Option<String>,
    /// New college id
    pub college_id: Option<String>,
}

/// Query parameters for listing courses.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListCoursesQuery {
    /// Maximum number of records to return (default: 20)
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0)
    pub skip: Option<i64>,
    /// Restrict to one college
    pub college_id: Option<String>,
    /// Comma-separated list of course ids to restrict to
    pub course_ids: Option<String>,
}

fn validated_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Course name is required"));
    }
    Ok(name.to_string())
}

/// Create a new course
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = ApiResponse<CourseView>),
        (status = 400, description = "Validation failed or invalid college id", body = ErrorEnvelope),
    ),
    tag = "courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseDto>,
) -> Result<ApiResponse<CourseView>, ApiError> {
    let name = validated_name(&request.name)?;
    let course_code = request.course_code.trim().to_string();
    if course_code.is_empty() {
        return Err(ApiError::validation("Course code is required"));
    }
    let college_id = parse_body_ref(&request.college_id, "Invalid college id")?;

    let repo = CourseRepository::new(&state.db);
    let course = repo
        .create(CreateCourse {
            name,
            course_code,
            college_id,
        })
        .await?;

    Ok(ApiResponse::created(
        "Course created successfully",
        course.into(),
    ))
}

/// List courses with pagination and optional filters
#[utoipa::path(
    get,
    path = "/courses",
    params(ListCoursesQuery),
    responses(
        (status = 200, description = "Courses listed", body = ApiResponse<Vec<CourseView>>),
        (status = 400, description = "Invalid pagination or filter", body = ErrorEnvelope),
    ),
    tag = "courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<ApiResponse<Vec<CourseView>>, ApiError> {
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
    let course_ids = query
        .course_ids
        .as_deref()
        .map(parse_id_list)
        .transpose()?
        .filter(|ids| !ids.is_empty());

    let repo = CourseRepository::new(&state.db);
    let courses = repo
        .list(
            CourseFilter {
                college_id,
                course_ids,
            },
            page,
        )
        .await?;

    Ok(ApiResponse::ok(
        "Courses fetched successfully",
        courses.into_iter().map(CourseView::from).collect(),
    ))
}

/// Get a course by id
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course fetched", body = ApiResponse<CourseView>),
        (status = 404, description = "Course not found", body = ErrorEnvelope),
    ),
    tag = "courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CourseView>, ApiError> {
    let id = parse_path_id(&id, "Course")?;

    let repo = CourseRepository::new(&state.db);
    let course = repo.get(id).await?;

    Ok(ApiResponse::ok("Course fetched successfully", course.into()))
}

/// Update a course
#[utoipa::path(
    patch,
    path = "/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<CourseView>),
        (status = 404, description = "Course not found", body = ErrorEnvelope),
    ),
    tag = "courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCourseDto>,
) -> Result<ApiResponse<CourseView>, ApiError> {
    let id = parse_path_id(&id, "Course")?;
    let name = request.name.as_deref().map(validated_name).transpose()?;
    let college_id = request
        .college_id
        .as_deref()
        .map(|raw| parse_body_ref(raw, "Invalid college id"))
        .transpose()?;

    let repo = CourseRepository::new(&state.db);
    let course = repo
        .update(
            id,
            UpdateCourse {
                name,
                course_code: request.course_code,
                college_id,
            },
        )
        .await?;

    Ok(ApiResponse::ok("Course updated successfully", course.into()))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse<Option<CourseView>>),
        (status = 404, description = "Course not found", body = ErrorEnvelope),
    ),
    tag = "courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let id = parse_path_id(&id, "Course")?;

    let repo = CourseRepository::new(&state.db);
    repo.delete(id).await?;

    Ok(ApiResponse::ok(
        "Course deleted successfully",
        serde_json::Value::Null,
    ))
}
