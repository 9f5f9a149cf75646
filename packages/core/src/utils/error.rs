// Типы ошибок компонентов

use crate::error::CryptoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantumError {
    #[error("Component is not initialized")]
    NotInitialized,

    #[error("Component is already initialized")]
    AlreadyInitialized,

    #[error("Component has been shut down")]
    AlreadyShutdown,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl QuantumError {
    /// Операция вызвана вне допустимого состояния жизненного цикла
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            QuantumError::NotInitialized
                | QuantumError::AlreadyInitialized
                | QuantumError::AlreadyShutdown
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QuantumError::InvalidArgument(msg.into())
    }

    pub(crate) fn failed(msg: impl Into<String>) -> Self {
        QuantumError::OperationFailed(msg.into())
    }
}

impl From<CryptoError> for QuantumError {
    fn from(err: CryptoError) -> Self {
        if err.is_input_error() {
            QuantumError::InvalidArgument(err.to_string())
        } else {
            QuantumError::OperationFailed(err.to_string())
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for QuantumError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        QuantumError::OperationFailed("internal lock poisoned".to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuantumError>;
