use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(id: &str) -> Self {
        Self::NotFound(format!("todo {id} not found"))
    }

    /// Any failure to produce a stored record: absent key or an undecodable value.
    pub fn is_missing_record(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Model(models::errors::ModelError::Decode(_)))
    }
}

/// Collapse any storage-engine error into [`ServiceError::Storage`].
pub(crate) fn storage_err<E: std::fmt::Display>(e: E) -> ServiceError {
    ServiceError::Storage(e.to_string())
}
