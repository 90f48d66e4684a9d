use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Not in a usp-canvas project. Run 'usp-canvas init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .usp-canvas/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid item kind: {0}")]
    InvalidItemKind(String),

    #[error("Invalid rating: {0}")]
    InvalidRating(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Version conflict: expected version {expected}, store has {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("Canvas stored as version {version}, but its history entry was not written: {message}")]
    HistoryNotRecorded { version: i64, message: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for CanvasError {
    fn from(e: rusqlite::Error) -> Self {
        CanvasError::Storage(format!("SQLite error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;
