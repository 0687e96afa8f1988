//! Construction and loading errors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown advisor `{0}`")]
    UnknownAdvisor(String),
    #[error("invalid event catalog: {0}")]
    InvalidCatalog(String),
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
