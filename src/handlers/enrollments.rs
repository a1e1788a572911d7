//! # Student Course Mapping API Handlers
//!
//! The enrollment endpoint runs the orchestrator; the read endpoint
//! returns the student together with their enrolled courses.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::enrollment::{self, EnrollmentRequest};
use crate::error::{ApiError, ErrorEnvelope};
use crate::handlers::courses::CourseView;
use crate::handlers::students::StudentView;
use crate::handlers::types::{ApiResponse, parse_body_ref, parse_path_id};
use crate::server::AppState;

/// Request payload for enrolling a student into courses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEnrollmentDto {
    /// Student to enroll
    pub student_id: String,
    /// Courses to add; duplicates collapse to one enrollment
    pub course_ids: Vec<String>,
}

/// Successful enrollment payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentView {
    /// Enrolled student
    pub student_id: String,
    /// Courses committed by this request
    pub enrolled_course_ids: Vec<String>,
}

/// Student together with their enrolled courses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentEnrollmentsView {
    pub student: StudentView,
    pub courses: Vec<CourseView>,
}

/// Enroll a student into a set of courses
#[utoipa::path(
    post,
    path = "/student-course-mapping",
    request_body = CreateEnrollmentDto,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<EnrollmentView>),
        (status = 400, description = "Invalid course ids, missing timetables, or college mismatch", body = ErrorEnvelope),
        (status = 404, description = "Student not found", body = ErrorEnvelope),
        (status = 409, description = "Scheduling conflict or duplicate enrollment", body = ErrorEnvelope),
    ),
    tag = "student-course-mapping"
)]
pub async fn create_enrollment(
    State(state): State<AppState>,
    Json(request): Json<CreateEnrollmentDto>,
) -> Result<ApiResponse<EnrollmentView>, ApiError> {
    if request.course_ids.is_empty() {
        return Err(ApiError::validation("course_ids must not be empty"));
    }

    let student_id = parse_body_ref(&request.student_id, "Invalid student id")?;

    // Ids that are not even well-formed cannot resolve to courses; they are
    // reported the same way as unknown ids.
    let mut course_ids = Vec::with_capacity(request.course_ids.len());
    let mut malformed = Vec::new();
    for raw in &request.course_ids {
        match Uuid::parse_str(raw) {
            Ok(id) => course_ids.push(id),
            Err(_) => malformed.push(raw.clone()),
        }
    }
    if !malformed.is_empty() {
        return Err(
            ApiError::invalid_reference("One or more course ids are invalid")
                .with_details(json!({ "course_ids": malformed })),
        );
    }

    let outcome = enrollment::enroll(
        &state.db,
        EnrollmentRequest {
            student_id,
            course_ids,
        },
    )
    .await?;

    Ok(ApiResponse::created(
        "Student enrolled successfully",
        EnrollmentView {
            student_id: outcome.student_id.to_string(),
            enrolled_course_ids: outcome
                .enrolled_course_ids
                .iter()
                .map(Uuid::to_string)
                .collect(),
        },
    ))
}

/// Get a student's enrollments
#[utoipa::path(
    get,
    path = "/student-course-mapping/{student_id}",
    params(("student_id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Enrollments fetched", body = ApiResponse<StudentEnrollmentsView>),
        (status = 404, description = "Student not found", body = ErrorEnvelope),
    ),
    tag = "student-course-mapping"
)]
pub async fn get_student_enrollments(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<ApiResponse<StudentEnrollmentsView>, ApiError> {
    let student_id = parse_path_id(&student_id, "Student")?;

    let view = enrollment::student_enrollments(&state.db, student_id).await?;

    Ok(ApiResponse::ok(
        "Student course mappings fetched successfully",
        StudentEnrollmentsView {
            student: view.student.into(),
            courses: view.courses.into_iter().map(CourseView::from).collect(),
        },
    ))
}
