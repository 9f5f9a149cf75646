//! QuantumManager: операции над одним фиксированным набором примитивов
//!
//! По умолчанию используется гибридный набор X25519+Kyber768 /
//! Ed25519+Dilithium3; другой набор выбирается параметром типа:
//!
//! ```rust
//! use satox_quantum::crypto::quantum_manager::QuantumManager;
//! use satox_quantum::crypto::suites::ClassicSuiteProvider;
//!
//! let manager = QuantumManager::<ClassicSuiteProvider>::new();
//! manager.initialize().unwrap();
//! let pair = manager.generate_key_pair().unwrap();
//! let sig = manager.sign(&pair.private_key, b"tx").unwrap();
//! assert!(manager.verify(&pair.public_key, b"tx", &sig).unwrap());
//! ```

use crate::config::Config;
use crate::crypto::keys::KeyPair;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::registry::AlgorithmRegistry;
use crate::crypto::scheme::{PqScheme, SuiteScheme};
use crate::crypto::suites::HybridSuiteProvider;
use crate::state::lifecycle::LifecycleState;
use crate::utils::error::{QuantumError, Result};
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use zeroize::Zeroizing;

/// Результат инкапсуляции: шифротекст для получателя и общий секрет
pub struct SharedSecret {
    pub kem_ciphertext: Vec<u8>,
    pub secret: Zeroizing<Vec<u8>>,
}

pub struct QuantumManager<P: CryptoProvider = HybridSuiteProvider> {
    state: Mutex<LifecycleState>,
    scheme: SuiteScheme<P>,
    config: Config,
}

impl<P: CryptoProvider> QuantumManager<P> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: Mutex::new(LifecycleState::default()),
            scheme: SuiteScheme::new(),
            config,
        }
    }

    pub fn initialize(&self) -> Result<()> {
        use tracing::debug;

        self.state.lock()?.begin()?;
        debug!(
            target: "quantum::manager",
            suite = P::suite_name(),
            "QuantumManager initialized"
        );
        Ok(())
    }

    pub fn shutdown(&self) -> Result<()> {
        use tracing::debug;

        if self.state.lock()?.end() {
            debug!(target: "quantum::manager", "QuantumManager shut down");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.is_initialized())
            .unwrap_or(false)
    }

    fn ensure_initialized(&self) -> Result<()> {
        self.state.lock()?.ensure_initialized()
    }

    pub fn generate_key_pair(&self) -> Result<KeyPair> {
        use tracing::trace;

        self.ensure_initialized()?;
        let pair = self.scheme.generate_key_pair()?;
        trace!(
            target: "quantum::manager",
            public_key_len = pair.public_key.len(),
            "Generated key pair"
        );
        Ok(pair)
    }

    pub fn encrypt(&self, public_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        self.scheme.encrypt(public_key, data)
    }

    pub fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        self.scheme.decrypt(private_key, ciphertext)
    }

    pub fn sign(&self, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        self.scheme.sign(private_key, data)
    }

    /// `Ok(false)` для чужой или испорченной подписи
    pub fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
        self.ensure_initialized()?;
        self.scheme.verify(public_key, data, signature)
    }

    /// `Ok(true)`, если половины составляют одну пару текущего набора
    pub fn validate_key_pair(&self, public_key: &[u8], private_key: &[u8]) -> Result<bool> {
        self.ensure_initialized()?;
        self.scheme.matches_key_pair(public_key, private_key)
    }

    /// SHA-256 от данных
    pub fn compute_hash(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        Ok(Sha256::digest(data).to_vec())
    }

    /// `Ok(false)` для хэша другой длины или от других данных
    pub fn verify_hash(&self, data: &[u8], hash: &[u8]) -> Result<bool> {
        self.ensure_initialized()?;
        if hash.is_empty() {
            return Err(QuantumError::invalid("hash is empty"));
        }
        Ok(Sha256::digest(data).as_slice() == hash)
    }

    /// Установить общий секрет с владельцем `public_key`
    pub fn establish_shared_secret(&self, public_key: &[u8]) -> Result<SharedSecret> {
        self.ensure_initialized()?;
        let (kem_ciphertext, secret) = self.scheme.encapsulate(public_key)?;
        Ok(SharedSecret {
            kem_ciphertext,
            secret,
        })
    }

    /// Получить тот же секрет на стороне владельца приватного ключа
    pub fn derive_shared_secret(
        &self,
        private_key: &[u8],
        kem_ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.ensure_initialized()?;
        self.scheme.decapsulate(private_key, kem_ciphertext)
    }

    /// Равномерное целое из `[min, max]` (обе границы включены)
    pub fn generate_random_number(&self, min: i64, max: i64) -> Result<i64> {
        self.ensure_initialized()?;
        if min > max {
            return Err(QuantumError::invalid(format!(
                "invalid range: min {} > max {}",
                min, max
            )));
        }
        Ok(OsRng.gen_range(min..=max))
    }

    pub fn generate_random_bytes(&self, length: usize) -> Result<Vec<u8>> {
        self.ensure_initialized()?;
        if length == 0 {
            return Err(QuantumError::invalid("length must be positive"));
        }
        if length > self.config.max_random_bytes {
            return Err(QuantumError::invalid(format!(
                "length {} exceeds limit {}",
                length, self.config.max_random_bytes
            )));
        }
        let mut bytes = vec![0u8; length];
        OsRng.fill_bytes(&mut bytes);
        Ok(bytes)
    }

    pub fn get_version(&self) -> Result<String> {
        self.ensure_initialized()?;
        Ok(self.config.version.clone())
    }

    /// Имя используемого набора примитивов
    pub fn get_algorithm(&self) -> Result<String> {
        self.ensure_initialized()?;
        Ok(P::suite_name().to_string())
    }

    /// Имена алгоритмов встроенного каталога
    pub fn get_available_algorithms(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        Ok(AlgorithmRegistry::builtin().names())
    }
}

impl<P: CryptoProvider> Default for QuantumManager<P> {
    fn default() -> Self {
        Self::new()
    }
}
