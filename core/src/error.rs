use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage unreachable: {details}")]
    StoreUnavailable { details: String },

    #[error("Invalid upload: {reason}")]
    InvalidUpload { reason: String },

    #[error("Tenant '{external_id}' not found")]
    TenantNotFound { external_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
