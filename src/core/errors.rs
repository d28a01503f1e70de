use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

use crate::storage::Collection;

/// Unified error type for the domain, storage and configuration layers.
#[derive(Error, Debug)]
pub enum SpendError {
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{collection} row {id} not found")]
    NotFound { collection: Collection, id: Uuid },
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

pub type Result<T> = StdResult<T, SpendError>;

impl From<std::io::Error> for SpendError {
    fn from(err: std::io::Error) -> Self {
        SpendError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for SpendError {
    fn from(err: serde_json::Error) -> Self {
        SpendError::StorageError(err.to_string())
    }
}

impl From<crate::domain::FrequencyError> for SpendError {
    fn from(err: crate::domain::FrequencyError) -> Self {
        SpendError::InvalidInput(err.to_string())
    }
}

impl From<crate::domain::CategoryError> for SpendError {
    fn from(err: crate::domain::CategoryError) -> Self {
        SpendError::InvalidInput(err.to_string())
    }
}

/// Fatal failures of the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SpendError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
