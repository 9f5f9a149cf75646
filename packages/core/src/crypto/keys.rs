// Пара ключей, возвращаемая компонентами вызывающему коду

use crate::utils::error::{QuantumError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Пара ключей (public, private)
///
/// Возвращается по значению; компонент, создавший пару, копий не хранит.
/// Приватная половина затирается при drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl KeyPair {
    pub fn new(public_key: Vec<u8>, private_key: Vec<u8>) -> Result<Self> {
        if public_key.is_empty() || private_key.is_empty() {
            return Err(QuantumError::invalid("key pair halves must be non-empty"));
        }
        Ok(Self {
            public_key,
            private_key,
        })
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}
