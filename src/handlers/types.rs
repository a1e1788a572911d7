//! Shared handler types: the success envelope, pagination query handling,
//! and id parsing helpers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::repositories::Page;

/// Success response envelope: `{statusCode, success, message, data}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// HTTP status code duplicated into the body
    pub status_code: u16,
    /// Always true for successes
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
    /// Response payload
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok<S: Into<String>>(message: S, data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn created<S: Into<String>>(message: S, data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED.as_u16(),
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Pagination query parameters shared by the listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Maximum number of records to return (default: 20, must be positive)
    pub limit: Option<i64>,
    /// Number of records to skip (default: 0, must be non-negative)
    pub skip: Option<i64>,
}

impl PageQuery {
    /// Apply defaults and bounds: `limit` defaults to 20 and must be
    /// positive, `skip` defaults to 0 and must be non-negative.
    pub fn resolve(&self) -> Result<Page, ApiError> {
        let limit = self.limit.unwrap_or(20);
        if limit <= 0 {
            return Err(ApiError::validation("limit must be a positive integer"));
        }

        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ApiError::validation("skip must be a non-negative integer"));
        }

        Ok(Page {
            limit: limit as u64,
            skip: skip as u64,
        })
    }
}

/// Parse an opaque id from a path segment. Ids that cannot possibly
/// resolve are reported the same way as ids that do not exist.
pub(crate) fn parse_path_id(raw: &str, entity: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(entity))
}

/// Parse an opaque id referenced from a request body.
pub(crate) fn parse_body_ref(raw: &str, message: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::invalid_reference(message.to_string()).with_details(json!({ "value": raw }))
    })
}

/// Parse a comma-separated id list query parameter.
pub(crate) fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part)
                .map_err(|_| ApiError::validation(format!("Invalid id in list: {part}")))
        })
        .collect()
}
