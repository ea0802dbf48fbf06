use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failure modes of the external capabilities (search, inference).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalServiceError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External service error: {0}")]
    ExternalService(#[from] ExternalServiceError),

    /// A cascading operation completed only partially. Never absorbed.
    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn product_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Product", id }
    }

    pub fn review_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "Review", id }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;

// ── HTTP envelope ─────────────────────────────────────────────────────────────

/// Error returned by HTTP handlers. Serialises as `{statusCode, message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_)   => StatusCode::NOT_FOUND,
            ApiError::Conflict(_)   => StatusCode::CONFLICT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_)   => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::BadRequest(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m)
            | ApiError::BadGateway(m)
            | ApiError::Internal(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {:?}", self);
        }
        let body = ErrorBody {
            status_code: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Validation(m)      => ApiError::BadRequest(m),
            e @ MarketError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            MarketError::Conflict(m)        => ApiError::Conflict(m),
            MarketError::ExternalService(e) => ApiError::BadGateway(e.to_string()),
            e @ MarketError::Consistency(_) => ApiError::Internal(e.to_string()),
            MarketError::Internal(m)        => ApiError::Internal(m),
        }
    }
}
