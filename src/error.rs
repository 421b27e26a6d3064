use crate::domain::{PipelineError, SelectionError};
use thiserror::Error;

/// Lap board application error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

impl Error {
    pub fn invalid_configuration(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
