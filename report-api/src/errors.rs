use crate::config::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportApiError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("response serialization error: {0}")]
    ResponseSerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
