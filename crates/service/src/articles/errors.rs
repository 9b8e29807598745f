use thiserror::Error;

use crate::errors::StoreError;

/// Business errors for article workflows
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("missing required fields: {}", .required_fields.join(", "))]
    Validation { required_fields: Vec<&'static str> },
    #[error("article not found: {id}")]
    NotFound { id: String },
    #[error("duplicated codebar: {codebar}")]
    DuplicateCodebar { codebar: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ArticleError {
    pub fn missing_id() -> Self {
        Self::Validation { required_fields: vec!["id"] }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ArticleError::Validation { .. } => 1001,
            ArticleError::NotFound { .. } => 1002,
            ArticleError::DuplicateCodebar { .. } => 1003,
            ArticleError::Store(_) => 1200,
        }
    }
}
