// Модели данных для хранилища ключей

use crate::utils::error::{QuantumError, Result};
use crate::utils::time::current_timestamp_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Метаданные ключа (1:1 с записью)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Имя алгоритма из каталога или `"default"`
    pub algorithm: String,
    /// Миллисекунды с начала эпохи
    pub creation_time: i64,
    /// `None` - ключ не истекает
    pub expiration: Option<i64>,
    pub access_levels: BTreeSet<String>,
    /// Порядок вставки сохраняется
    pub tags: Vec<String>,
    /// Момент последней ротации (`rotate_key`)
    pub last_rotated_at: Option<i64>,
}

impl KeyMetadata {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            creation_time: current_timestamp_millis(),
            expiration: None,
            access_levels: BTreeSet::new(),
            tags: Vec::new(),
            last_rotated_at: None,
        }
    }

    pub fn with_expiration(mut self, expiration: i64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn with_access_level(mut self, level: impl Into<String>) -> Self {
        self.access_levels.insert(level.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        matches!(self.expiration, Some(expiration) if expiration <= now_millis)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| QuantumError::failed(format!("metadata serialization failed: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| QuantumError::invalid(format!("malformed metadata JSON: {}", e)))
    }

    /// Проверка обязательных полей и ограничения размера
    pub(crate) fn validate(&self, max_bytes: usize) -> Result<()> {
        if self.algorithm.trim().is_empty() {
            return Err(QuantumError::invalid("metadata.algorithm is required"));
        }
        if let Some(expiration) = self.expiration {
            if expiration <= self.creation_time {
                return Err(QuantumError::invalid(
                    "metadata.expiration must be later than creation_time",
                ));
            }
        }
        if self.access_levels.iter().any(|l| l.trim().is_empty()) {
            return Err(QuantumError::invalid("access level must be non-empty"));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(QuantumError::invalid("tag must be non-empty"));
        }

        let size = self.to_json()?.len();
        if size > max_bytes {
            return Err(QuantumError::invalid(format!(
                "metadata is {} bytes, limit is {}",
                size, max_bytes
            )));
        }
        Ok(())
    }
}

/// Логическое представление записи: идентификатор, материал, метаданные
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct StoredKey {
    #[zeroize(skip)]
    pub key_id: String,
    #[serde(with = "serde_bytes")]
    pub key_material: Vec<u8>,
    #[zeroize(skip)]
    pub metadata: KeyMetadata,
}

impl std::fmt::Debug for StoredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredKey")
            .field("key_id", &self.key_id)
            .field("key_material_len", &self.key_material.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Внутренняя запись хранилища
///
/// Материал зашифрован ключом записи (AAD = key_id), ключ записи обёрнут
/// мастер-ключом хранилища.
#[derive(Clone)]
pub(crate) struct KeyEntry {
    /// nonce || AES-256-GCM(material)
    pub encrypted_material: Vec<u8>,
    /// nonce || AES-256-GCM(data key)
    pub wrapped_data_key: Vec<u8>,
    /// SHA-256 открытого материала
    pub checksum: [u8; 32],
    pub metadata: KeyMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_json_roundtrip_keeps_tag_order() {
        let metadata = KeyMetadata::new("CRYSTALS-Kyber")
            .with_tag("wallet")
            .with_tag("cold")
            .with_access_level("read");

        let json = metadata.to_json().unwrap();
        let parsed = KeyMetadata::from_json(&json).unwrap();
        assert_eq!(parsed, metadata);
        assert_eq!(parsed.tags, vec!["wallet", "cold"]);
    }

    #[test]
    fn test_access_levels_collapse_duplicates() {
        let metadata = KeyMetadata::new("default")
            .with_access_level("admin")
            .with_access_level("admin");
        assert_eq!(metadata.access_levels.len(), 1);
    }

    #[test]
    fn test_validate() {
        assert!(KeyMetadata::new("default").validate(1024).is_ok());
        assert!(KeyMetadata::new(" ").validate(1024).is_err());
        assert!(KeyMetadata::new("default").with_tag("").validate(1024).is_err());

        let mut backwards = KeyMetadata::new("default");
        backwards.expiration = Some(backwards.creation_time);
        assert!(backwards.validate(1024).is_err());

        let oversized = KeyMetadata::new("default").with_tag("x".repeat(2048));
        assert!(oversized.validate(1024).is_err());
    }

    #[test]
    fn test_is_expired_at() {
        let metadata = KeyMetadata::new("default");
        assert!(!metadata.is_expired_at(i64::MAX));

        let metadata = metadata.clone().with_expiration(metadata.creation_time + 10);
        assert!(!metadata.is_expired_at(metadata.creation_time + 9));
        assert!(metadata.is_expired_at(metadata.creation_time + 10));
    }
}
