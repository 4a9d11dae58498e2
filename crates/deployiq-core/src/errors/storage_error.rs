/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("failed to (de)serialize {record}: {message}")]
    Serialization { record: String, message: String },

    #[error("invalid stored value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("connection lock poisoned: {details}")]
    LockPoisoned { details: String },
}

impl super::DeployErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => super::error_code::MIGRATION_FAILED,
            _ => super::error_code::STORAGE_ERROR,
        }
    }
}
