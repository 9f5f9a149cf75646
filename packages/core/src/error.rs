use thiserror::Error;

/// Ошибки криптографических примитивов (уровень CryptoProvider).
///
/// Компоненты верхнего уровня переводят их в [`crate::utils::error::QuantumError`].
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Failed to generate keys: {0}")]
    KeyGenerationError(String),
    #[error("Signing failed: {0}")]
    SigningError(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationError(String),
    #[error("KEM encapsulation failed: {0}")]
    KemEncapsulationError(String),
    #[error("KEM decapsulation failed: {0}")]
    KemDecapsulationError(String),
    #[error("AEAD encryption failed: {0}")]
    AeadEncryptionError(String),
    #[error("AEAD decryption failed: {0}")]
    AeadDecryptionError(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),
    #[error("Invalid input: {0}")]
    InvalidInputError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl CryptoError {
    /// Ошибка вызвана некорректными входными данными, а не сбоем операции
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CryptoError::InvalidInputError(_) | CryptoError::DeserializationError(_)
        )
    }
}
