use datastore::StoreError;
use domain::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The video is gone or belongs to someone else
    #[error("Video '{0}' not found")]
    NotFound(String),

    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LibraryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

pub type LibraryResult<T> = Result<T, LibraryError>;
