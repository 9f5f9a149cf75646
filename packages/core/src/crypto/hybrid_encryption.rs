//! HybridEncryption: сеансовый симметричный ключ + пост-квантовый конверт
//!
//! ```text
//! encrypt(pk, m):
//!   wrapped = SuiteScheme::encrypt(pk, session_key)      (KEM + AEAD)
//!   ct      = ChaCha20-Poly1305(session_key, nonce, m, aad = wrapped)
//!   out     = HybridCiphertext { version, wrapped, nonce, ct }
//! ```
//!
//! Получатель восстанавливает сеансовый ключ из `wrapped` своим приватным
//! ключом, поэтому расшифровка не зависит от текущего ключа экземпляра и
//! переживает ротацию.

use crate::config::Config;
use crate::crypto::keys::KeyPair;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::scheme::{PqScheme, SuiteScheme};
use crate::crypto::suites::HybridSuiteProvider;
use crate::error::CryptoError;
use crate::state::lifecycle::LifecycleState;
use crate::storage::memory::KeyStorage;
use crate::storage::models::KeyMetadata;
use crate::utils::error::{QuantumError, Result};
use crate::utils::serialization;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const FORMAT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct HybridCiphertext {
    version: u8,
    #[serde(with = "serde_bytes")]
    wrapped_session_key: Vec<u8>,
    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    ciphertext: Vec<u8>,
}

const KEY_PAIR_TAG: &str = "hybrid-key-pair";

/// Запись пары ключей в KeyStorage (bincode)
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredKeyPair {
    #[serde(with = "serde_bytes")]
    public_key: Vec<u8>,
    #[serde(with = "serde_bytes")]
    private_key: Vec<u8>,
}

#[derive(Default)]
struct SessionState {
    lifecycle: LifecycleState,
    session_key: Option<Zeroizing<Vec<u8>>>,
    /// Сколько шифрований выполнено под текущим ключом
    messages: u64,
}

pub struct HybridEncryption<P: CryptoProvider = HybridSuiteProvider> {
    state: Mutex<SessionState>,
    scheme: SuiteScheme<P>,
    config: Config,
}

impl<P: CryptoProvider> HybridEncryption<P> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            scheme: SuiteScheme::new(),
            config,
        }
    }

    pub fn initialize(&self) -> Result<()> {
        use tracing::debug;

        self.state.lock()?.lifecycle.begin()?;
        debug!(
            target: "quantum::hybrid",
            suite = P::suite_name(),
            rotate_after = self.config.session_key_max_messages,
            "HybridEncryption initialized"
        );
        Ok(())
    }

    /// Завершение работы; сеансовый ключ затирается
    pub fn shutdown(&self) -> Result<()> {
        use tracing::debug;

        let mut state = self.state.lock()?;
        if state.lifecycle.end() {
            state.session_key = None;
            state.messages = 0;
            debug!(target: "quantum::hybrid", "HybridEncryption shut down, session key wiped");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.lifecycle.is_initialized())
            .unwrap_or(false)
    }

    fn ensure_initialized(&self) -> Result<()> {
        self.state.lock()?.lifecycle.ensure_initialized()
    }

    fn fresh_session_key(&self) -> Zeroizing<Vec<u8>> {
        let mut key = Zeroizing::new(vec![0u8; self.config.session_key_length]);
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Ключ для очередного сообщения: создаётся при первом использовании,
    /// ротируется по достижении `session_key_max_messages`.
    /// Счётчик сообщений не меняется, см. [`Self::count_message`].
    fn session_key_for_message(&self) -> Result<Zeroizing<Vec<u8>>> {
        use tracing::debug;

        let mut state = self.state.lock()?;
        state.lifecycle.ensure_initialized()?;

        let limit = self.config.session_key_max_messages;
        if state.session_key.is_some() && limit > 0 && state.messages >= limit {
            debug!(
                target: "quantum::hybrid",
                messages = state.messages,
                "Session key reached message limit, rotating"
            );
            state.session_key = None;
        }
        if state.session_key.is_none() {
            state.session_key = Some(self.fresh_session_key());
            state.messages = 0;
        }

        state
            .session_key
            .clone()
            .ok_or_else(|| QuantumError::failed("session key unavailable"))
    }

    /// Учесть успешно зашифрованное сообщение, если ключ за это время не сменился
    fn count_message(&self, used_key: &[u8]) -> Result<()> {
        let mut state = self.state.lock()?;
        if state.session_key.as_ref().map(|key| key.as_slice()) == Some(used_key) {
            state.messages += 1;
        }
        Ok(())
    }

    pub fn generate_key_pair(&self) -> Result<KeyPair> {
        self.ensure_initialized()?;
        self.scheme.generate_key_pair()
    }

    pub fn encrypt(&self, public_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        use tracing::trace;

        let session_key = self.session_key_for_message()?;
        let wrapped_session_key = self.scheme.encrypt(public_key, &session_key)?;

        let nonce = P::generate_nonce(self.config.chacha_nonce_length)?;
        let aead_key = P::aead_key_from_bytes(session_key.to_vec());
        let ciphertext = P::aead_encrypt(
            &aead_key,
            &nonce,
            data,
            Some(wrapped_session_key.as_slice()),
        )?;
        self.count_message(&session_key)?;

        trace!(
            target: "quantum::hybrid",
            plaintext_len = data.len(),
            ciphertext_len = ciphertext.len(),
            "Encrypted under session key"
        );

        let envelope = HybridCiphertext {
            version: FORMAT_VERSION,
            wrapped_session_key,
            nonce,
            ciphertext,
        };
        Ok(serialization::to_bytes(&envelope)?)
    }

    pub fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        if ciphertext.is_empty() {
            return Err(QuantumError::invalid("ciphertext is empty"));
        }
        let envelope: HybridCiphertext = serialization::from_bytes(ciphertext)
            .map_err(|_| QuantumError::invalid("malformed hybrid ciphertext"))?;
        if envelope.version != FORMAT_VERSION {
            return Err(QuantumError::invalid(format!(
                "unsupported hybrid ciphertext version {}",
                envelope.version
            )));
        }

        let session_key =
            Zeroizing::new(self.scheme.decrypt(private_key, &envelope.wrapped_session_key)?);
        let aead_key = P::aead_key_from_bytes(session_key.to_vec());

        P::aead_decrypt(
            &aead_key,
            &envelope.nonce,
            &envelope.ciphertext,
            Some(envelope.wrapped_session_key.as_slice()),
        )
        .map_err(|e| match e {
            CryptoError::InvalidInputError(msg) => QuantumError::invalid(msg),
            other => QuantumError::failed(other.to_string()),
        })
    }

    /// Перешифровать сообщение под новый ключ получателя
    pub fn reencrypt(
        &self,
        old_private_key: &[u8],
        new_public_key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let plaintext = Zeroizing::new(self.decrypt(old_private_key, ciphertext)?);
        self.encrypt(new_public_key, &plaintext)
    }

    // === Пары ключей в KeyStorage ===

    /// Сохранить пару под `key_id`. Пара должна принадлежать набору `P`.
    pub fn store_keys(&self, storage: &KeyStorage, key_id: &str, pair: &KeyPair) -> Result<()> {
        use tracing::debug;

        self.ensure_initialized()?;
        if !self.scheme.matches_key_pair(&pair.public_key, &pair.private_key)? {
            return Err(QuantumError::invalid(format!(
                "key pair does not match suite {}",
                P::suite_name()
            )));
        }

        let record = StoredKeyPair {
            public_key: pair.public_key.clone(),
            private_key: pair.private_key.clone(),
        };
        let bytes = Zeroizing::new(serialization::to_bytes(&record)?);
        let metadata = KeyMetadata::new(P::suite_name()).with_tag(KEY_PAIR_TAG);
        storage.store_key_with_id(key_id, &bytes, metadata)?;

        debug!(target: "quantum::hybrid", key_id, "Key pair stored");
        Ok(())
    }

    /// Прочитать пару, сохранённую [`Self::store_keys`] с тем же набором
    pub fn retrieve_keys(&self, storage: &KeyStorage, key_id: &str) -> Result<KeyPair> {
        self.ensure_initialized()?;

        let metadata = storage.get_key_metadata(key_id)?;
        let is_pair = metadata.tags.iter().any(|tag| tag == KEY_PAIR_TAG);
        if metadata.algorithm != P::suite_name() || !is_pair {
            return Err(QuantumError::invalid(format!(
                "key {} is not a {} key pair",
                key_id,
                P::suite_name()
            )));
        }

        let bytes = storage.get_key(key_id)?;
        let mut record: StoredKeyPair = serialization::from_bytes(&bytes)
            .map_err(|_| QuantumError::invalid("malformed stored key pair"))?;
        KeyPair::new(
            std::mem::take(&mut record.public_key),
            std::mem::take(&mut record.private_key),
        )
    }

    /// `Ok(true)`, если пара согласована и принадлежит набору `P`
    pub fn validate_keys(&self, pair: &KeyPair) -> Result<bool> {
        self.ensure_initialized()?;
        self.scheme.matches_key_pair(&pair.public_key, &pair.private_key)
    }

    /// Текущий сеансовый ключ; создаётся при первом обращении
    pub fn get_session_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        let mut state = self.state.lock()?;
        state.lifecycle.ensure_initialized()?;
        if state.session_key.is_none() {
            state.session_key = Some(self.fresh_session_key());
            state.messages = 0;
        }
        state
            .session_key
            .clone()
            .ok_or_else(|| QuantumError::failed("session key unavailable"))
    }

    /// Заменить сеансовый ключ целиком. Старый ключ затирается.
    pub fn rotate_session_key(&self) -> Result<bool> {
        use tracing::debug;

        let mut state = self.state.lock()?;
        state.lifecycle.ensure_initialized()?;
        state.session_key = Some(self.fresh_session_key());
        state.messages = 0;

        debug!(target: "quantum::hybrid", "Session key rotated");
        Ok(true)
    }

    pub fn get_version(&self) -> Result<String> {
        self.ensure_initialized()?;
        Ok(self.config.version.clone())
    }

    pub fn get_algorithm(&self) -> Result<String> {
        self.ensure_initialized()?;
        Ok(P::suite_name().to_string())
    }
}

impl<P: CryptoProvider> Default for HybridEncryption<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::ClassicSuiteProvider;

    #[test]
    fn test_automatic_rotation_after_message_limit() {
        let config = Config {
            session_key_max_messages: 2,
            ..Config::default()
        };
        let hybrid = HybridEncryption::<ClassicSuiteProvider>::with_config(config);
        hybrid.initialize().unwrap();
        let pair = hybrid.generate_key_pair().unwrap();

        hybrid.encrypt(&pair.public_key, b"1").unwrap();
        let first = hybrid.get_session_key().unwrap();
        hybrid.encrypt(&pair.public_key, b"2").unwrap();
        assert_eq!(hybrid.get_session_key().unwrap(), first);

        hybrid.encrypt(&pair.public_key, b"3").unwrap();
        assert_ne!(hybrid.get_session_key().unwrap(), first);
    }

    #[test]
    fn test_rejected_encrypt_does_not_count_towards_rotation() {
        let config = Config {
            session_key_max_messages: 2,
            ..Config::default()
        };
        let hybrid = HybridEncryption::<ClassicSuiteProvider>::with_config(config);
        hybrid.initialize().unwrap();
        let pair = hybrid.generate_key_pair().unwrap();
        let key = hybrid.get_session_key().unwrap();

        for bad_key in [&[0u8; 0][..], &b"garbage"[..], pair.private_key.as_slice()] {
            assert!(matches!(
                hybrid.encrypt(bad_key, b"m"),
                Err(QuantumError::InvalidArgument(_))
            ));
        }
        assert_eq!(hybrid.state.lock().unwrap().messages, 0);

        hybrid.encrypt(&pair.public_key, b"1").unwrap();
        hybrid.encrypt(&pair.public_key, b"2").unwrap();
        assert_eq!(hybrid.get_session_key().unwrap(), key);
        assert_eq!(hybrid.state.lock().unwrap().messages, 2);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let hybrid = HybridEncryption::<ClassicSuiteProvider>::new();
        hybrid.initialize().unwrap();
        let pair = hybrid.generate_key_pair().unwrap();

        let forged = serialization::to_bytes(&HybridCiphertext {
            version: 9,
            wrapped_session_key: vec![1],
            nonce: vec![0; 12],
            ciphertext: vec![2],
        })
        .unwrap();
        assert!(matches!(
            hybrid.decrypt(&pair.private_key, &forged),
            Err(QuantumError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_shutdown_wipes_session_key() {
        let hybrid = HybridEncryption::<ClassicSuiteProvider>::new();
        hybrid.initialize().unwrap();
        hybrid.get_session_key().unwrap();
        hybrid.shutdown().unwrap();

        assert!(hybrid.state.lock().unwrap().session_key.is_none());
        assert!(matches!(hybrid.get_session_key(), Err(QuantumError::NotInitialized)));
    }
}
