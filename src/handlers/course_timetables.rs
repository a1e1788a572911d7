//! # Course Timetables API Handlers
//!
//! Endpoints for weekly timetable entries. Midnight-crossing entries are
//! split on write and reassembled on read by the repository; the HTTP
//! surface only ever shows one logical entry per created timetable.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorEnvelope};
use crate::handlers::types::{ApiResponse, PageQuery, parse_body_ref, parse_id_list, parse_path_id};
use crate::repositories::course_timetable::{
    CourseTimetableRepository, LogicalTimetable, TimetableDraft, TimetableFilter, TimetablePatch,
};
use crate::scheduling::{DayOfWeek, parse_time};
use crate::server::AppState;

/// Timetable entry as returned to clients (always the logical entry).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimetableView {
    /// Opaque timetable entry identifier
    pub id: String,
    /// Day the interval starts on
    pub day: String,
    /// Start time, `HH:MM:SS`
    pub start_time: String,
    /// End time, `HH:MM:SS`; earlier than start for midnight-crossing entries
    pub end_time: String,
    /// Course this entry belongs to
    pub course_id: String,
}

impl From<LogicalTimetable> for TimetableView {
    fn from(entry: LogicalTimetable) -> Self {
        Self {
            id: entry.id.to_string(),
            day: entry.day,
            start_time: entry.start_time.format("%H:%M:%S").to_string(),
            end_time: entry.end_time.format("%H:%M:%S").to_string(),
            course_id: entry.course_id.to_string(),
        }
    }
}

/// Request payload for creating a timetable entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateTimetableDto {
    /// Exact English day name (Monday .. Sunday)
    #[schema(example = "Monday")]
    pub day: String,
    /// Start time, `HH:MM:SS` or `HH:MM`
    #[schema(example = "09:00:00")]
    pub start_time: String,
    /// End time, `HH:MM:SS` or `HH:MM`; an end earlier than the start
    /// denotes an interval crossing into the next day
    #[schema(example = "10:30:00")]
    pub end_time: String,
    /// Course this entry belongs to
    pub course_id: String,
}

/// Request payload for updating a timetable entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTimetableDto {
    /// New day name
    pub day: Option<String>,
    /// New start time
    pub start_time: Option<String>,
    /// New end time
    pub end_time: Option<String>,
    /// New course id
    pub course_id: Option<String>,
}

/// Query parameters for listing timetable entries.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListTimetablesQuery {
    /// Maximum number of records to return (default: 20)
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0)
    pub skip: Option<i64>,
    /// Comma-separated list of course ids to restrict to
    pub course_ids: Option<String>,
}

fn parse_day(raw: &str) -> Result<DayOfWeek, ApiError> {
    DayOfWeek::from_str(raw).map_err(|_| {
        ApiError::validation("day must be an exact English day name (Monday .. Sunday)")
            .with_details(json!({ "day": raw }))
    })
}

fn parse_clock(raw: &str, field: &str) -> Result<NaiveTime, ApiError> {
    parse_time(raw).map_err(|_| {
        ApiError::validation(format!("{field} must be a valid HH:MM:SS time"))
            .with_details(json!({ "value": raw }))
    })
}

/// Create a timetable entry
#[utoipa::path(
    post,
    path = "/course-timetables",
    request_body = CreateTimetableDto,
    responses(
        (status = 201, description = "Timetable entry created", body = ApiResponse<TimetableView>),
        (status = 400, description = "Validation failed or invalid course id", body = ErrorEnvelope),
        (status = 409, description = "Overlapping timetable slot", body = ErrorEnvelope),
    ),
    tag = "course-timetables"
)]
pub async fn create_timetable(
    State(state): State<AppState>,
    Json(request): Json<CreateTimetableDto>,
) -> Result<ApiResponse<TimetableView>, ApiError> {
    let draft = TimetableDraft {
        day: parse_day(&request.day)?,
        start_time: parse_clock(&request.start_time, "start_time")?,
        end_time: parse_clock(&request.end_time, "end_time")?,
        course_id: parse_body_ref(&request.course_id, "Invalid course id")?,
    };

    let repo = CourseTimetableRepository::new(&state.db);
    let entry = repo.create(draft).await?;

    Ok(ApiResponse::created(
        "Course timetable created successfully",
        entry.into(),
    ))
}

/// List timetable entries with pagination and optional course filter
#[utoipa::path(
    get,
    path = "/course-timetables",
    params(ListTimetablesQuery),
    responses(
        (status = 200, description = "Timetable entries listed", body = ApiResponse<Vec<TimetableView>>),
        (status = 400, description = "Invalid pagination or filter", body = ErrorEnvelope),
    ),
    tag = "course-timetables"
)]
pub async fn list_timetables(
    State(state): State<AppState>,
    Query(query): Query<ListTimetablesQuery>,
) -> Result<ApiResponse<Vec<TimetableView>>, ApiError> {
    let page = PageQuery {
        limit: query.limit,
        skip: query.skip,
    }
    .resolve()?;

    let course_ids = query
        .course_ids
        .as_deref()
        .map(parse_id_list)
        .transpose()?
        .filter(|ids| !ids.is_empty());

    let repo = CourseTimetableRepository::new(&state.db);
    let entries = repo.list(TimetableFilter { course_ids }, page).await?;

    Ok(ApiResponse::ok(
        "Course timetables fetched successfully",
        entries.into_iter().map(TimetableView::from).collect(),
    ))
}

/// Get a timetable entry by id
#[utoipa::path(
    get,
    path = "/course-timetables/{id}",
    params(("id" = String, Path, description = "Timetable entry id")),
    responses(
        (status = 200, description = "Timetable entry fetched", body = ApiResponse<TimetableView>),
        (status = 404, description = "Timetable entry not found", body = ErrorEnvelope),
    ),
    tag = "course-timetables"
)]
pub async fn get_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<TimetableView>, ApiError> {
    let id = parse_path_id(&id, "Course timetable")?;

    let repo = CourseTimetableRepository::new(&state.db);
    let entry = repo.get(id).await?;

    Ok(ApiResponse::ok(
        "Course timetable fetched successfully",
        entry.into(),
    ))
}

/// Update a timetable entry
#[utoipa::path(
    patch,
    path = "/course-timetables/{id}",
    params(("id" = String, Path, description = "Timetable entry id")),
    request_body = UpdateTimetableDto,
    responses(
        (status = 200, description = "Timetable entry updated", body = ApiResponse<TimetableView>),
        (status = 404, description = "Timetable entry not found", body = ErrorEnvelope),
        (status = 409, description = "Overlapping timetable slot", body = ErrorEnvelope),
    ),
    tag = "course-timetables"
)]
pub async fn update_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTimetableDto>,
) -> Result<ApiResponse<TimetableView>, ApiError> {
    let id = parse_path_id(&id, "Course timetable")?;

    let patch = TimetablePatch {
        day: request.day.as_deref().map(parse_day).transpose()?,
        start_time: request
            .start_time
            .as_deref()
            .map(|raw| parse_clock(raw, "start_time"))
            .transpose()?,
        end_time: request
            .end_time
            .as_deref()
            .map(|raw| parse_clock(raw, "end_time"))
            .transpose()?,
        course_id: request
            .course_id
            .as_deref()
            .map(|raw| parse_body_ref(raw, "Invalid course id"))
            .transpose()?,
    };

    let repo = CourseTimetableRepository::new(&state.db);
    let entry = repo.update(id, patch).await?;

    Ok(ApiResponse::ok(
        "Course timetable updated successfully",
        entry.into(),
    ))
}

/// Delete a timetable entry (and its continuation row, if split)
#[utoipa::path(
    delete,
    path = "/course-timetables/{id}",
    params(("id" = String, Path, description = "Timetable entry id")),
    responses(
        (status = 200, description = "Timetable entry deleted", body = ApiResponse<Option<TimetableView>>),
        (status = 404, description = "Timetable entry not found", body = ErrorEnvelope),
    ),
    tag = "course-timetables"
)]
pub async fn delete_timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let id = parse_path_id(&id, "Course timetable")?;

    let repo = CourseTimetableRepository::new(&state.db);
    repo.delete(id).await?;

    Ok(ApiResponse::ok(
        "Course timetable deleted successfully",
        serde_json::Value::Null,
    ))
}
