use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Run '{run_id}' has already completed")]
    RunAlreadyCompleted { run_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GenResult<T> = Result<T, GenError>;
