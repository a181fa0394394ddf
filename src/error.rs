//! Structured error types for task operations.

use crate::types::TaskId;
use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // Not found errors
    TaskNotFound,

    // Persistence errors
    DatabaseError,

    // Anything the caller did not anticipate
    InternalError,
}

/// Coarse error taxonomy the UI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; recoverable by re-prompting.
    Validation,
    /// The operation targeted a task that does not exist.
    NotFound,
    /// The store failed for any reason.
    Persistence,
    /// Unexpected failure outside the service contract.
    Internal,
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => ErrorKind::Validation,
            ErrorCode::TaskNotFound => ErrorKind::NotFound,
            ErrorCode::DatabaseError => ErrorKind::Persistence,
            ErrorCode::InternalError => ErrorKind::Internal,
        }
    }
}

/// Structured error returned by the task service.
///
/// `message` is always safe to show to the user; store-level detail is logged,
/// never carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Message shown for failures the caller did not anticipate.
pub const GENERIC_FAILURE: &str = "Something went wrong";

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn title_required() -> Self {
        Self::new(ErrorCode::MissingRequiredField, "Title is required").with_field("title")
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn task_not_found(id: TaskId) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {}", id))
    }

    /// Store failure, described by the operation that failed.
    pub fn persistence(action: &str) -> Self {
        Self::new(ErrorCode::DatabaseError, format!("Failed to {} task", action))
    }

    pub fn unexpected() -> Self {
        Self::new(ErrorCode::InternalError, GENERIC_FAILURE)
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
