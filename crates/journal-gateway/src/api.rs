//! Response envelope `{ success, data?, error?, message?, details? }` and HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contact_journal_core::JournalError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            details: None,
            timestamp: None,
        })
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. `{ success: true, message: "..." }`.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self::bare(message.into(), None))
    }

    /// Like [`ApiResponse::message`] with the current time attached.
    pub fn stamped(message: impl Into<String>) -> Json<Self> {
        Json(Self::bare(message.into(), Some(now_iso())))
    }

    fn bare(message: String, timestamp: Option<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message),
            details: None,
            timestamp,
        }
    }
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Error returned by handlers; renders as a `success: false` envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error)
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Map a core error. Unexpected failures become a 500 with `context` as the client
    /// message; the underlying error is only logged.
    pub fn from_journal(err: JournalError, context: &str) -> Self {
        match err {
            JournalError::NotFound(msg) => Self::not_found(msg),
            JournalError::Validation { message, problems } => Self::bad_request(message)
                .with_details(serde_json::to_value(problems).unwrap_or_default()),
            JournalError::ServiceUnavailable(msg) => {
                tracing::error!("{}: {}", context, msg);
                Self::new(StatusCode::SERVICE_UNAVAILABLE, context)
            }
            other => {
                tracing::error!("{}: {}", context, other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
            }
        }
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        Self::from_journal(err, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.error),
            message: None,
            details: self.details,
            timestamp: None,
        };
        (self.status, Json(body)).into_response()
    }
}
