use thiserror::Error;

use crate::core::types::EntityId;

#[derive(Error, Debug)]
pub enum EchoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid wave parameters: {0}")]
    InvalidWave(String),

    #[error("Sound wave pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl EchoError {
    /// Recoverable conditions callers are expected to tolerate silently
    pub fn is_pool_exhausted(&self) -> bool {
        matches!(self, EchoError::PoolExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, EchoError>;
