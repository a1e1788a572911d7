//! # Error Handling
//!
//! Unified error handling for the Registrar API. Every failure is one of a
//! fixed taxonomy of classes, rendered into the standard failure envelope
//! `{statusCode, success, message, error: {type, details}, timestamp, path}`.
//! Store-level constraint violations that slip past application checks are
//! mapped back into the same taxonomy instead of leaking driver codes.

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Application error taxonomy.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// A referenced entity id does not resolve.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A foreign id in a request body does not exist.
    #[error("{message}")]
    InvalidReference {
        message: String,
        details: Option<Value>,
    },

    /// Malformed or out-of-range request input.
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },

    /// A course lacks a timetable or crosses college boundaries.
    #[error("{message}")]
    IncompleteEnrollmentPrerequisite {
        message: String,
        details: Option<Value>,
    },

    /// Two timetable intervals overlap.
    #[error("{message}")]
    SchedulingConflict {
        message: String,
        details: Option<Value>,
    },

    /// A requested course is already enrolled.
    #[error("{message}")]
    DuplicateEnrollment {
        message: String,
        details: Option<Value>,
    },

    /// Unclassified persistence failure; logged, never retried here.
    #[error("storage failure: {message}")]
    StoreFailure { message: String },
}

impl ApiError {
    pub fn not_found(entity: &'static str) -> Self {
        ApiError::NotFound { entity }
    }

    pub fn invalid_reference<S: Into<String>>(message: S) -> Self {
        ApiError::InvalidReference {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn incomplete_prerequisite<S: Into<String>>(message: S) -> Self {
        ApiError::IncompleteEnrollmentPrerequisite {
            message: message.into(),
            details: None,
        }
    }

    pub fn scheduling_conflict<S: Into<String>>(message: S) -> Self {
        ApiError::SchedulingConflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn duplicate_enrollment<S: Into<String>>(message: S) -> Self {
        ApiError::DuplicateEnrollment {
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details to variants that carry them.
    pub fn with_details(mut self, value: Value) -> Self {
        match &mut self {
            ApiError::InvalidReference { details, .. }
            | ApiError::Validation { details, .. }
            | ApiError::IncompleteEnrollmentPrerequisite { details, .. }
            | ApiError::SchedulingConflict { details, .. }
            | ApiError::DuplicateEnrollment { details, .. } => *details = Some(value),
            ApiError::NotFound { .. } | ApiError::StoreFailure { .. } => {}
        }
        self
    }

    /// Stable error class string (SCREAMING_SNAKE_CASE).
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::InvalidReference { .. } => "INVALID_REFERENCE",
            ApiError::Validation { .. } => "VALIDATION_FAILED",
            ApiError::IncompleteEnrollmentPrerequisite { .. } => {
                "INCOMPLETE_ENROLLMENT_PREREQUISITE"
            }
            ApiError::SchedulingConflict { .. } => "SCHEDULING_CONFLICT",
            ApiError::DuplicateEnrollment { .. } => "DUPLICATE_ENROLLMENT",
            ApiError::StoreFailure { .. } => "STORE_FAILURE",
        }
    }

    /// HTTP status for this error class.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidReference { .. }
            | ApiError::Validation { .. }
            | ApiError::IncompleteEnrollmentPrerequisite { .. } => StatusCode::BAD_REQUEST,
            ApiError::SchedulingConflict { .. } | ApiError::DuplicateEnrollment { .. } => {
                StatusCode::CONFLICT
            }
            ApiError::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::InvalidReference { details, .. }
            | ApiError::Validation { details, .. }
            | ApiError::IncompleteEnrollmentPrerequisite { details, .. }
            | ApiError::SchedulingConflict { details, .. }
            | ApiError::DuplicateEnrollment { details, .. } => details.clone(),
            ApiError::NotFound { .. } | ApiError::StoreFailure { .. } => None,
        }
    }

    /// Render the standard failure envelope.
    pub fn envelope(&self, path: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            status_code: self.status().as_u16(),
            success: false,
            message: self.to_string(),
            error: ErrorDetail {
                kind: self.kind().to_string(),
                details: self.details(),
            },
            timestamp: Utc::now().to_rfc3339(),
            path: path.map(str::to_string),
        }
    }
}

/// Failure response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// HTTP status code duplicated into the body
    pub status_code: u16,
    /// Always false for failures
    pub success: bool,
    /// Human-readable failure reason
    pub message: String,
    /// Error class and structured details
    pub error: ErrorDetail,
    /// Time the failure was rendered (RFC 3339)
    pub timestamp: String,
    /// Request path, attached by middleware
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Error class and optional structured details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable SCREAMING_SNAKE_CASE error class
    #[serde(rename = "type")]
    pub kind: String,
    /// Structured details for correcting the request (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The envelope is rendered without a path here; attach_error_path
        // re-renders it with the request path when the middleware is
        // installed. Stashing the error in the extensions is what lets the
        // middleware recover the typed value from an opaque Response.
        let mut response = (self.status(), Json(self.envelope(None))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Response middleware that re-renders failure envelopes with the request
/// path filled in.
pub async fn attach_error_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;
    if let Some(error) = response.extensions_mut().remove::<ApiError>() {
        let status = error.status();
        return (status, Json(error.envelope(Some(&path)))).into_response();
    }
    response
}

pub(crate) fn is_unique_violation(error: &DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const SQLITE_UNIQUE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code = code.as_ref();
        code == PG_UNIQUE || SQLITE_UNIQUE_CODES.contains(&code)
    })
}

pub(crate) fn is_foreign_key_violation(error: &DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_FOREIGN_KEY: &str = "23503";
    const SQLITE_FOREIGN_KEY_CODES: &[&str] = &["787", "1811"];

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_foreign_key_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code = code.as_ref();
        code == PG_FOREIGN_KEY || SQLITE_FOREIGN_KEY_CODES.contains(&code)
    })
}

impl From<DbErr> for ApiError {
    fn from(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "unique constraint violation");
            return ApiError::validation("A record with these values already exists");
        }

        if is_foreign_key_violation(&error) {
            tracing::debug!(?error, "foreign key violation");
            return ApiError::invalid_reference("A referenced record does not exist");
        }

        match error {
            DbErr::RecordNotFound(record) => {
                tracing::debug!(%record, "record not found");
                ApiError::not_found("Record")
            }
            other => {
                tracing::error!(error = ?other, "unclassified database error");
                ApiError::StoreFailure {
                    message: "a storage error occurred".to_string(),
                }
            }
        }
    }
}
