//! Error types for the keeper service

use nextcopper_core::RebaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeeperError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rebase error: {0}")]
    Rebase(RebaseError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Oracle error: {0}")]
    OracleError(String),

    #[error("State error: {0}")]
    StateError(String),
}

impl KeeperError {
    /// Errors that should stop the service instead of waiting for the next tick
    pub fn is_fatal(&self) -> bool {
        match self {
            KeeperError::Rebase(err) => err.is_fatal(),
            KeeperError::StateError(_) | KeeperError::InvalidConfig(_) => true,
            _ => false,
        }
    }
}

impl From<RebaseError> for KeeperError {
    fn from(err: RebaseError) -> Self {
        KeeperError::Rebase(err)
    }
}

impl From<std::io::Error> for KeeperError {
    fn from(err: std::io::Error) -> Self {
        KeeperError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        KeeperError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for KeeperError {
    fn from(err: toml::de::Error) -> Self {
        KeeperError::InvalidConfig(err.to_string())
    }
}

impl From<toml::ser::Error> for KeeperError {
    fn from(err: toml::ser::Error) -> Self {
        KeeperError::SerializationError(err.to_string())
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;
