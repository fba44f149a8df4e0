use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("project {0} not found")]
    ProjectNotFound(i64),

    #[error("file {0} not found")]
    FileNotFound(uuid::Uuid),

    #[error("lock {0} is already held")]
    LockHeld(String),

    #[error("lock {0} is not held by this handle")]
    LockNotHeld(String),

    #[error("schema migration failed at version {version}: {reason}")]
    Migration { version: i64, reason: String },
}
