use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Not registered for this event")]
    NotRegistered,

    #[error("Not confirmed for this event")]
    NotConfirmed,

    #[error("Already confirmed for this event")]
    AlreadyConfirmed,

    #[error("No free slots left")]
    NoCapacity,

    #[error("Operation not permitted for this participant kind")]
    Forbidden,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Record is locked by another admin")]
    Locked,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Notification failed: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StorageError::InvalidArgument(msg.into())
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }
}
