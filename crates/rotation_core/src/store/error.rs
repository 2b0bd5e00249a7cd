use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupted record: {0}")]
    Corrupted(String),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Match not found: {id}")]
    MatchNotFound { id: String },
}

impl StoreError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Io(_) => true,
            StoreError::MatchNotFound { .. } => true,
            StoreError::VersionMismatch { .. } => true, // Can try migration
            StoreError::Corrupted(_) => false,
            StoreError::Json(_) => false,
        }
    }
}
