//! Error taxonomy shared by every back-office operation

use crate::task::{TaskEvent, TaskStatus};

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password (never distinguished)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session id is unknown, was logged out, or sat idle too long
    #[error("Session expired or not found")]
    SessionExpired,
}

/// Errors returned by back-office operations.
///
/// None of these are fatal; each is reported at the boundary of the action
/// that triggered it and leaves stored state untouched.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Record store failure (I/O, driver, serialization)
    #[error("Store error: {0}")]
    Store(String),

    /// Attempted an action the viewer's role does not allow
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Missing or malformed required field
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Event not defined for the task's current state
    #[error("Cannot {event} a task that is {from}")]
    InvalidTransition { from: TaskStatus, event: TaskEvent },

    /// Conditional write lost against a concurrent writer
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DeskError {
    pub fn denied(message: impl Into<String>) -> Self {
        DeskError::PermissionDenied(message.into())
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        DeskError::Validation(message.into())
    }

    /// Short machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DeskError::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            DeskError::Auth(AuthError::SessionExpired) => "SESSION_EXPIRED",
            DeskError::Store(_) => "STORE_ERROR",
            DeskError::PermissionDenied(_) => "PERMISSION_DENIED",
            DeskError::Validation(_) => "VALIDATION_ERROR",
            DeskError::NotFound(_) => "NOT_FOUND",
            DeskError::InvalidTransition { .. } => "INVALID_TRANSITION",
            DeskError::Conflict(_) => "CONFLICT",
        }
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(e: serde_json::Error) -> Self {
        DeskError::Validation(format!("Malformed record: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;
