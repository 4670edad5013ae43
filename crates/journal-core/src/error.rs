//! Error types shared by the journal core services.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for core operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// One field-level problem found while validating a tenant document or a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

impl FieldProblem {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the config resolver, journal store and user directory.
#[derive(Error, Debug)]
pub enum JournalError {
    /// User or tenant absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed tenant document or request body. `problems` lists every violation found.
    #[error("{message}")]
    Validation {
        message: String,
        problems: Vec<FieldProblem>,
    },

    /// Storage or an external dependency is unreachable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl JournalError {
    pub fn validation(message: impl Into<String>, problems: Vec<FieldProblem>) -> Self {
        JournalError::Validation {
            message: message.into(),
            problems,
        }
    }

    /// Field problems carried by a validation error; empty for every other variant.
    pub fn problems(&self) -> &[FieldProblem] {
        match self {
            JournalError::Validation { problems, .. } => problems,
            _ => &[],
        }
    }
}

/// Errors raised while generating feedback. Never surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum FeedbackError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("LLM returned no choices")]
    EmptyResponse,

    #[error("LLM response is not valid feedback JSON: {0}")]
    MalformedResponse(String),

    #[error("journal write failed: {0}")]
    Storage(#[from] JournalError),
}
