//! HTTP handlers for all web routes.
//!
//! Successful responses are wrapped in [`ApiResponse`]; failures are
//! [`ApiError`]s, which carry no payload.

pub mod health;
pub mod moderator;
pub mod products;
pub mod reviews;

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use trustmart_common::ApiError;
use uuid::Uuid;

/// Header carrying the authenticated user, set by the upstream auth layer.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub payload: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(payload: T, message: impl Into<String>) -> Self {
        Self { status_code: StatusCode::OK.as_u16(), payload, message: message.into() }
    }

    pub fn created(payload: T, message: impl Into<String>) -> Self {
        Self { status_code: StatusCode::CREATED.as_u16(), payload, message: message.into() }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct PersistQuery {
    #[serde(default)]
    pub persist: bool,
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("{raw:?} is not a valid id")))
}

pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub(crate) fn user_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest(format!("missing {USER_ID_HEADER} header")))?;
    parse_id(raw.trim())
}
