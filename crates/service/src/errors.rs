use thiserror::Error;

/// Failure raised by a record store. The message is the underlying cause, verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),
    #[error("store serialization error: {0}")]
    Serialization(String),
    #[error("invalid store path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub fn io(e: impl std::fmt::Display) -> Self { Self::Io(e.to_string()) }
    pub fn serialization(e: impl std::fmt::Display) -> Self { Self::Serialization(e.to_string()) }
}
