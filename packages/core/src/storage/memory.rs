// In-memory хранилище ключей с шифрованием записей
//
// Каждая запись шифруется собственным ключом (AES-256-GCM, AAD = key_id),
// ключ записи обёрнут мастер-ключом хранилища. Мастер-ключ создаётся при
// initialize() и затирается при shutdown().

use crate::config::Config;
use crate::crypto::master_key::{self, KEY_LENGTH};
use crate::state::lifecycle::LifecycleState;
use crate::storage::models::{KeyEntry, KeyMetadata, StoredKey};
use crate::utils::error::{QuantumError, Result};
use crate::utils::time::current_timestamp_millis;
use crate::utils::uuid;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::{Zeroize, Zeroizing};

const STORAGE_ALGORITHM: &str = "AES-256-GCM";

/// Статистика обращений к ключу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage {
    pub access_count: u64,
    pub last_accessed_at: Option<i64>,
}

struct Vault {
    master_key: Zeroizing<[u8; KEY_LENGTH]>,
    entries: HashMap<String, KeyEntry>,
    usage: HashMap<String, KeyUsage>,
}

impl Vault {
    fn new() -> Self {
        Self {
            master_key: master_key::generate_key(),
            entries: HashMap::new(),
            usage: HashMap::new(),
        }
    }

    fn entry(&self, key_id: &str) -> Result<&KeyEntry> {
        self.entries
            .get(key_id)
            .ok_or_else(|| QuantumError::KeyNotFound(key_id.to_string()))
    }

    fn entry_mut(&mut self, key_id: &str) -> Result<&mut KeyEntry> {
        self.entries
            .get_mut(key_id)
            .ok_or_else(|| QuantumError::KeyNotFound(key_id.to_string()))
    }

    /// Зашифровать материал под новым ключом записи
    fn seal(&self, key_id: &str, material: &[u8], metadata: KeyMetadata) -> Result<KeyEntry> {
        let data_key = master_key::generate_key();
        Ok(KeyEntry {
            encrypted_material: master_key::encrypt_data(&data_key, material, key_id.as_bytes())?,
            wrapped_data_key: master_key::encrypt_data(
                &self.master_key,
                &data_key[..],
                key_id.as_bytes(),
            )?,
            checksum: Sha256::digest(material).into(),
            metadata,
        })
    }

    fn data_key(&self, key_id: &str, entry: &KeyEntry) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
        let raw = master_key::decrypt_data(&self.master_key, &entry.wrapped_data_key, key_id.as_bytes())?;
        master_key::to_key_array(&raw)
    }

    /// Расшифровать материал и сверить контрольную сумму
    fn open(&self, key_id: &str, entry: &KeyEntry) -> Result<Zeroizing<Vec<u8>>> {
        let data_key = self.data_key(key_id, entry)?;
        let material =
            master_key::decrypt_data(&data_key, &entry.encrypted_material, key_id.as_bytes())?;

        let checksum: [u8; 32] = Sha256::digest(material.as_slice()).into();
        if checksum != entry.checksum {
            return Err(QuantumError::failed(format!(
                "integrity check failed for key {}",
                key_id
            )));
        }
        Ok(material)
    }

    fn touch(&mut self, key_id: &str) {
        let usage = self.usage.entry(key_id.to_string()).or_insert(KeyUsage {
            access_count: 0,
            last_accessed_at: None,
        });
        usage.access_count += 1;
        usage.last_accessed_at = Some(current_timestamp_millis());
    }

    fn remove(&mut self, key_id: &str) -> Option<KeyEntry> {
        self.usage.remove(key_id);
        self.entries.remove(key_id).map(|mut entry| {
            wipe(&mut entry);
            entry
        })
    }
}

fn wipe(entry: &mut KeyEntry) {
    entry.encrypted_material.zeroize();
    entry.wrapped_data_key.zeroize();
    entry.checksum.zeroize();
}

struct Inner {
    lifecycle: LifecycleState,
    vault: Option<Vault>,
}

/// Зашифрованное хранилище ключей с метаданными и уровнями доступа
pub struct KeyStorage {
    inner: Mutex<Inner>,
    config: Config,
}

impl KeyStorage {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lifecycle: LifecycleState::default(),
                vault: None,
            }),
            config,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub fn initialize(&self) -> Result<()> {
        use tracing::info;

        let mut inner = self.inner.lock()?;
        inner.lifecycle.begin()?;
        inner.vault = Some(Vault::new());

        info!(target: "quantum::key_storage", "KeyStorage initialized");
        Ok(())
    }

    /// Завершение работы: записи и мастер-ключ затираются
    pub fn shutdown(&self) -> Result<()> {
        use tracing::info;

        let mut inner = self.inner.lock()?;
        if inner.lifecycle.end() {
            if let Some(mut vault) = inner.vault.take() {
                let count = vault.entries.len();
                for entry in vault.entries.values_mut() {
                    wipe(entry);
                }
                info!(
                    target: "quantum::key_storage",
                    wiped_keys = count,
                    "KeyStorage shut down"
                );
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.lifecycle.is_initialized())
            .unwrap_or(false)
    }

    fn with_vault<T>(&self, f: impl FnOnce(&mut Vault) -> Result<T>) -> Result<T> {
        let mut inner = self.inner.lock()?;
        inner.lifecycle.ensure_initialized()?;
        let vault = inner.vault.as_mut().ok_or(QuantumError::NotInitialized)?;
        f(vault)
    }

    fn validate_material(material: &[u8]) -> Result<()> {
        if material.is_empty() {
            return Err(QuantumError::invalid("key material is empty"));
        }
        Ok(())
    }

    fn validate_level(level: &str) -> Result<()> {
        if level.trim().is_empty() {
            return Err(QuantumError::invalid("access level is empty"));
        }
        Ok(())
    }

    // === CRUD ===

    /// Сохранить ключ; идентификатор (UUID v4) генерируется хранилищем
    pub fn store_key(&self, material: &[u8], metadata: KeyMetadata) -> Result<String> {
        use tracing::debug;

        self.with_vault(|vault| {
            Self::validate_material(material)?;
            metadata.validate(self.config.max_metadata_bytes)?;

            let mut key_id = uuid::generate_v4();
            while vault.entries.contains_key(&key_id) {
                key_id = uuid::generate_v4();
            }

            let algorithm = metadata.algorithm.clone();
            let entry = vault.seal(&key_id, material, metadata)?;
            vault.entries.insert(key_id.clone(), entry);

            debug!(
                target: "quantum::key_storage",
                key_id = %key_id,
                algorithm = %algorithm,
                "Key stored"
            );
            Ok(key_id)
        })
    }

    /// Сохранить ключ под идентификатором вызывающего кода
    pub fn store_key_with_id(&self, key_id: &str, material: &[u8], metadata: KeyMetadata) -> Result<()> {
        use tracing::debug;

        self.with_vault(|vault| {
            if key_id.trim().is_empty() {
                return Err(QuantumError::invalid("key id is empty"));
            }
            Self::validate_material(material)?;
            metadata.validate(self.config.max_metadata_bytes)?;

            if vault.entries.contains_key(key_id) {
                return Err(QuantumError::invalid(format!("key {} already exists", key_id)));
            }
            let entry = vault.seal(key_id, material, metadata)?;
            vault.entries.insert(key_id.to_string(), entry);

            debug!(target: "quantum::key_storage", key_id, "Key stored with caller id");
            Ok(())
        })
    }

    pub fn get_key(&self, key_id: &str) -> Result<Zeroizing<Vec<u8>>> {
        self.with_vault(|vault| {
            let material = vault.open(key_id, vault.entry(key_id)?)?;
            vault.touch(key_id);
            Ok(material)
        })
    }

    /// Удалить ключ. Повторное удаление возвращает `KeyNotFound`.
    pub fn delete_key(&self, key_id: &str) -> Result<bool> {
        use tracing::debug;

        self.with_vault(|vault| {
            vault
                .remove(key_id)
                .ok_or_else(|| QuantumError::KeyNotFound(key_id.to_string()))?;
            debug!(target: "quantum::key_storage", key_id, "Key deleted");
            Ok(true)
        })
    }

    /// Заменить материал; ключ записи и метаданные не меняются
    pub fn update_key(&self, key_id: &str, material: &[u8]) -> Result<bool> {
        self.with_vault(|vault| {
            Self::validate_material(material)?;
            let data_key = vault.data_key(key_id, vault.entry(key_id)?)?;
            let encrypted = master_key::encrypt_data(&data_key, material, key_id.as_bytes())?;

            let entry = vault.entry_mut(key_id)?;
            entry.encrypted_material.zeroize();
            entry.encrypted_material = encrypted;
            entry.checksum = Sha256::digest(material).into();
            Ok(true)
        })
    }

    pub fn get_key_metadata(&self, key_id: &str) -> Result<KeyMetadata> {
        self.with_vault(|vault| Ok(vault.entry(key_id)?.metadata.clone()))
    }

    pub fn update_key_metadata(&self, key_id: &str, metadata: KeyMetadata) -> Result<bool> {
        self.with_vault(|vault| {
            metadata.validate(self.config.max_metadata_bytes)?;
            vault.entry_mut(key_id)?.metadata = metadata;
            Ok(true)
        })
    }

    // === Ротация и перешифрование ===

    /// Новый материал под новым ключом записи; `last_rotated_at = now`
    pub fn rotate_key(&self, key_id: &str, new_material: &[u8]) -> Result<bool> {
        use tracing::info;

        self.with_vault(|vault| {
            Self::validate_material(new_material)?;

            let mut metadata = vault.entry(key_id)?.metadata.clone();
            metadata.last_rotated_at = Some(current_timestamp_millis());

            let entry = vault.seal(key_id, new_material, metadata)?;
            if let Some(mut old) = vault.entries.insert(key_id.to_string(), entry) {
                wipe(&mut old);
            }

            info!(target: "quantum::key_storage", key_id, "Key rotated");
            Ok(true)
        })
    }

    /// Перешифровать запись новым ключом записи; `get_key` возвращает те же байты
    pub fn reencrypt_key(&self, key_id: &str) -> Result<bool> {
        use tracing::debug;

        self.with_vault(|vault| {
            let entry = vault.entry(key_id)?;
            let material = vault.open(key_id, entry)?;
            let resealed = vault.seal(key_id, &material, entry.metadata.clone())?;
            if let Some(mut old) = vault.entries.insert(key_id.to_string(), resealed) {
                wipe(&mut old);
            }

            debug!(target: "quantum::key_storage", key_id, "Key re-encrypted");
            Ok(true)
        })
    }

    // === Проверки ===

    /// `Ok(false)`, если запись не расшифровывается или не сходится контрольная сумма
    pub fn validate_key(&self, key_id: &str) -> Result<bool> {
        use tracing::warn;

        self.with_vault(|vault| {
            let entry = vault.entry(key_id)?;
            match vault.open(key_id, entry) {
                Ok(_) => Ok(true),
                Err(e) => {
                    warn!(target: "quantum::key_storage", key_id, error = %e, "Key failed validation");
                    Ok(false)
                }
            }
        })
    }

    /// Проверить все записи
    pub fn validate_all_keys(&self) -> Result<bool> {
        self.with_vault(|vault| {
            Ok(vault
                .entries
                .iter()
                .all(|(key_id, entry)| vault.open(key_id, entry).is_ok()))
        })
    }

    pub fn is_key_expired(&self, key_id: &str) -> Result<bool> {
        self.with_vault(|vault| {
            Ok(vault
                .entry(key_id)?
                .metadata
                .is_expired_at(current_timestamp_millis()))
        })
    }

    /// Удалить истёкшие ключи. Возвращает число удалённых.
    pub fn purge_expired_keys(&self) -> Result<usize> {
        use tracing::info;

        self.with_vault(|vault| {
            let now = current_timestamp_millis();
            let expired: Vec<String> = vault
                .entries
                .iter()
                .filter(|(_, entry)| entry.metadata.is_expired_at(now))
                .map(|(key_id, _)| key_id.clone())
                .collect();

            for key_id in &expired {
                vault.remove(key_id);
            }

            if !expired.is_empty() {
                info!(target: "quantum::key_storage", purged = expired.len(), "Expired keys purged");
            }
            Ok(expired.len())
        })
    }

    // === Уровни доступа ===

    pub fn has_access(&self, key_id: &str, level: &str) -> Result<bool> {
        self.with_vault(|vault| {
            Self::validate_level(level)?;
            Ok(vault.entry(key_id)?.metadata.access_levels.contains(level))
        })
    }

    /// Добавить уровень доступа; повторное добавление - успешный no-op
    pub fn add_access_level(&self, key_id: &str, level: &str) -> Result<bool> {
        let max_bytes = self.config.max_metadata_bytes;

        self.with_vault(|vault| {
            Self::validate_level(level)?;
            let entry = vault.entry_mut(key_id)?;
            if entry.metadata.access_levels.contains(level) {
                return Ok(true);
            }
            let mut metadata = entry.metadata.clone();
            metadata.access_levels.insert(level.to_string());
            metadata.validate(max_bytes)?;
            entry.metadata = metadata;
            Ok(true)
        })
    }

    /// Убрать уровень доступа; отсутствующий уровень - успешный no-op
    pub fn remove_access_level(&self, key_id: &str, level: &str) -> Result<bool> {
        self.with_vault(|vault| {
            Self::validate_level(level)?;
            vault.entry_mut(key_id)?.metadata.access_levels.remove(level);
            Ok(true)
        })
    }

    // === Агрегаты ===

    pub fn get_key_count(&self) -> Result<usize> {
        self.with_vault(|vault| Ok(vault.entries.len()))
    }

    /// Все идентификаторы, отсортированные
    pub fn get_all_key_ids(&self) -> Result<Vec<String>> {
        self.with_vault(|vault| {
            let mut ids: Vec<String> = vault.entries.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    pub fn get_key_usage(&self, key_id: &str) -> Result<KeyUsage> {
        self.with_vault(|vault| {
            vault.entry(key_id)?;
            Ok(vault.usage.get(key_id).copied().unwrap_or(KeyUsage {
                access_count: 0,
                last_accessed_at: None,
            }))
        })
    }

    /// Алгоритм шифрования записей
    pub fn get_algorithm(&self) -> Result<String> {
        self.with_vault(|_| Ok(STORAGE_ALGORITHM.to_string()))
    }

    pub fn get_version(&self) -> Result<String> {
        self.with_vault(|_| Ok(self.config.version.clone()))
    }

    // === Резервное копирование (storage::backup) ===

    /// Снимок всех записей в открытом виде
    pub(crate) fn snapshot(&self) -> Result<Vec<StoredKey>> {
        self.with_vault(|vault| {
            let mut keys = Vec::with_capacity(vault.entries.len());
            for (key_id, entry) in &vault.entries {
                let material = vault.open(key_id, entry)?;
                keys.push(StoredKey {
                    key_id: key_id.clone(),
                    key_material: material.to_vec(),
                    metadata: entry.metadata.clone(),
                });
            }
            keys.sort_by(|a, b| a.key_id.cmp(&b.key_id));
            Ok(keys)
        })
    }

    /// Загрузить записи; все или ни одной
    pub(crate) fn restore(&self, keys: &[StoredKey]) -> Result<usize> {
        self.with_vault(|vault| {
            for key in keys {
                if key.key_id.trim().is_empty() {
                    return Err(QuantumError::invalid("backup contains an empty key id"));
                }
                Self::validate_material(&key.key_material)?;
                key.metadata.validate(self.config.max_metadata_bytes)?;
            }

            if let Some(existing) = keys.iter().find(|k| vault.entries.contains_key(&k.key_id)) {
                return Err(QuantumError::invalid(format!(
                    "key {} already exists",
                    existing.key_id
                )));
            }

            let mut sealed = Vec::with_capacity(keys.len());
            for key in keys {
                let entry = vault.seal(&key.key_id, &key.key_material, key.metadata.clone())?;
                sealed.push((key.key_id.clone(), entry));
            }
            let count = sealed.len();
            vault.entries.extend(sealed);
            Ok(count)
        })
    }

    #[cfg(test)]
    fn corrupt_entry(&self, key_id: &str) -> Result<()> {
        self.with_vault(|vault| {
            let entry = vault.entry_mut(key_id)?;
            if let Some(byte) = entry.encrypted_material.last_mut() {
                *byte ^= 0xFF;
            }
            Ok(())
        })
    }
}

impl Default for KeyStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> KeyStorage {
        let storage = KeyStorage::new();
        storage.initialize().unwrap();
        storage
    }

    #[test]
    fn test_corrupted_entry_fails_validation_not_lookup() {
        let storage = storage();
        let id = storage.store_key(&[7u8; 32], KeyMetadata::new("default")).unwrap();
        assert!(storage.validate_key(&id).unwrap());

        storage.corrupt_entry(&id).unwrap();
        assert!(!storage.validate_key(&id).unwrap());
        assert!(!storage.validate_all_keys().unwrap());
        assert!(matches!(storage.get_key(&id), Err(QuantumError::OperationFailed(_))));
    }

    #[test]
    fn test_reencrypt_changes_ciphertext_not_material() {
        let storage = storage();
        let id = storage.store_key(b"material", KeyMetadata::new("default")).unwrap();
        let before = storage
            .with_vault(|v| Ok(v.entry(&id)?.encrypted_material.clone()))
            .unwrap();

        storage.reencrypt_key(&id).unwrap();

        let after = storage
            .with_vault(|v| Ok(v.entry(&id)?.encrypted_material.clone()))
            .unwrap();
        assert_ne!(before, after);
        assert_eq!(storage.get_key(&id).unwrap().as_slice(), b"material");
    }

    #[test]
    fn test_update_key_keeps_metadata() {
        let storage = storage();
        let metadata = KeyMetadata::new("NTRU").with_tag("hot");
        let id = storage.store_key(b"v1", metadata.clone()).unwrap();

        storage.update_key(&id, b"v2").unwrap();
        assert_eq!(storage.get_key(&id).unwrap().as_slice(), b"v2");
        assert_eq!(storage.get_key_metadata(&id).unwrap(), metadata);
    }

    #[test]
    fn test_get_key_counts_usage() {
        let storage = storage();
        let id = storage.store_key(b"k", KeyMetadata::new("default")).unwrap();
        assert_eq!(storage.get_key_usage(&id).unwrap().access_count, 0);

        storage.get_key(&id).unwrap();
        storage.get_key(&id).unwrap();
        let usage = storage.get_key_usage(&id).unwrap();
        assert_eq!(usage.access_count, 2);
        assert!(usage.last_accessed_at.is_some());
    }

    #[test]
    fn test_add_access_level_respects_metadata_limit() {
        let config = Config {
            max_metadata_bytes: 200,
            ..Config::default()
        };
        let storage = KeyStorage::with_config(config);
        storage.initialize().unwrap();
        let id = storage.store_key(b"k", KeyMetadata::new("default")).unwrap();

        assert!(storage.add_access_level(&id, &"x".repeat(300)).is_err());
        assert!(!storage.has_access(&id, &"x".repeat(300)).unwrap());
    }
}
