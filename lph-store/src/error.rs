use lph_core::{DeskError, EntityKind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// A guarded write found the record in an unexpected state
    #[error("{kind} '{id}' was changed by someone else")]
    Conflict { kind: EntityKind, id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DeskError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => DeskError::NotFound(e.to_string()),
            StoreError::Conflict { .. } => DeskError::Conflict(e.to_string()),
            other => DeskError::Store(other.to_string()),
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match *e.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Backend(e.to_string()),
        }
    }
}
