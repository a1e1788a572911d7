//! # API Handlers
//!
//! HTTP endpoint handlers for the Registrar API.

use axum::extract::State;
use axum::response::Json;

use crate::db;
use crate::error::{ApiError, ErrorEnvelope};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod colleges;
pub mod course_timetables;
pub mod courses;
pub mod enrollments;
pub mod students;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe that verifies the database connection
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = ServiceInfo),
        (status = 500, description = "Database unreachable", body = ErrorEnvelope)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<ServiceInfo>, ApiError> {
    db::health_check(&state.db)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "health check failed");
            ApiError::StoreFailure {
                message: "database unreachable".to_string(),
            }
        })?;

    Ok(Json(ServiceInfo::default()))
}
