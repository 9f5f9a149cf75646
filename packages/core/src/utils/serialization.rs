// Сериализация (bincode, little-endian, fixed-int)

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};

pub fn to_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>, CryptoError> {
    bincode::serialize(data).map_err(|e| CryptoError::SerializationError(e.to_string()))
}

pub fn from_bytes<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, CryptoError> {
    bincode::deserialize(bytes).map_err(|e| CryptoError::DeserializationError(e.to_string()))
}
