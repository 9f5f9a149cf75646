// Резервная копия хранилища, запечатанная паролем
//
// Формат (bincode):
//   SealedBackup { version, salt (32), sealed = nonce || AES-256-GCM(payload) }
//   payload = Vec<StoredKey>
// Ключ копии: PBKDF2-HMAC-SHA256(password, salt, Config::pbkdf2_iterations).

use crate::crypto::master_key::{
    decrypt_data, derive_master_key, encrypt_data, generate_salt, validate_password,
};
use crate::storage::memory::KeyStorage;
use crate::storage::models::StoredKey;
use crate::utils::error::{QuantumError, Result};
use crate::utils::serialization;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub const BACKUP_FORMAT_VERSION: u8 = 1;
const BACKUP_AAD: &[u8] = b"satox-key-storage-backup";

#[derive(Serialize, Deserialize)]
struct SealedBackup {
    version: u8,
    #[serde(with = "serde_bytes")]
    salt: Vec<u8>,
    #[serde(with = "serde_bytes")]
    sealed: Vec<u8>,
}

impl KeyStorage {
    /// Экспортировать все ключи, зашифровав их ключом из пароля
    pub fn export_backup(&self, password: &str) -> Result<Vec<u8>> {
        use tracing::info;

        if !self.is_initialized() {
            return Err(QuantumError::NotInitialized);
        }
        validate_password(password, self.config())?;

        let keys = self.snapshot()?;
        let payload = Zeroizing::new(serialization::to_bytes(&keys)?);

        let salt = generate_salt();
        let backup_key = derive_master_key(password, &salt, self.config())?;
        let sealed = encrypt_data(&backup_key, &payload, BACKUP_AAD)?;

        info!(target: "quantum::key_storage", keys = keys.len(), "Backup exported");

        Ok(serialization::to_bytes(&SealedBackup {
            version: BACKUP_FORMAT_VERSION,
            salt: salt.to_vec(),
            sealed,
        })?)
    }

    /// Импортировать копию. Существующий идентификатор отменяет весь импорт.
    ///
    /// Неверный пароль - `OperationFailed`.
    pub fn import_backup(&self, backup: &[u8], password: &str) -> Result<usize> {
        use tracing::info;

        // До PBKDF2, чтобы не тратить время на неинициализированном хранилище
        if !self.is_initialized() {
            return Err(QuantumError::NotInitialized);
        }
        if backup.is_empty() {
            return Err(QuantumError::invalid("backup is empty"));
        }

        let sealed: SealedBackup = serialization::from_bytes(backup)
            .map_err(|_| QuantumError::invalid("malformed backup"))?;
        if sealed.version != BACKUP_FORMAT_VERSION {
            return Err(QuantumError::invalid(format!(
                "unsupported backup version {}",
                sealed.version
            )));
        }

        let backup_key = derive_master_key(password, &sealed.salt, self.config())?;
        let payload = decrypt_data(&backup_key, &sealed.sealed, BACKUP_AAD)?;
        let keys: Vec<StoredKey> = serialization::from_bytes(&payload)
            .map_err(|_| QuantumError::invalid("malformed backup payload"))?;

        let imported = self.restore(&keys)?;
        info!(target: "quantum::key_storage", keys = imported, "Backup imported");
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::storage::memory::KeyStorage;
    use crate::storage::models::KeyMetadata;
    use crate::utils::error::QuantumError;

    fn storage() -> KeyStorage {
        let storage = KeyStorage::with_config(Config::for_tests());
        storage.initialize().unwrap();
        storage
    }

    #[test]
    fn test_weak_password_rejected_on_export() {
        let storage = storage();
        assert!(matches!(
            storage.export_backup("short"),
            Err(QuantumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_import_into_conflicting_store_is_atomic() {
        let source = storage();
        source
            .store_key_with_id("a", b"one", KeyMetadata::new("default"))
            .unwrap();
        source
            .store_key_with_id("b", b"two", KeyMetadata::new("default"))
            .unwrap();
        let backup = source.export_backup("backup2024").unwrap();

        let target = storage();
        target
            .store_key_with_id("b", b"other", KeyMetadata::new("default"))
            .unwrap();

        assert!(target.import_backup(&backup, "backup2024").is_err());
        assert_eq!(target.get_key_count().unwrap(), 1);
        assert_eq!(target.get_key("b").unwrap().as_slice(), b"other");
    }

    #[test]
    fn test_garbage_backup_is_invalid_argument() {
        let storage = storage();
        assert!(matches!(
            storage.import_backup(&[1, 2, 3], "backup2024"),
            Err(QuantumError::InvalidArgument(_))
        ));
    }
}
