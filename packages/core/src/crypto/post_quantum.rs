//! PostQuantumAlgorithms: операции QuantumManager, параметризованные именем
//! алгоритма из [`AlgorithmRegistry`].
//!
//! Алгоритм по умолчанию справочный: криптографические операции всегда
//! принимают имя явно и ничего не подставляют.

use crate::config::Config;
use crate::crypto::keys::KeyPair;
use crate::crypto::registry::{AlgorithmInfo, AlgorithmRegistry};
use crate::crypto::scheme::PqScheme;
use crate::state::lifecycle::LifecycleState;
use crate::utils::error::{QuantumError, Result};
use std::sync::{Arc, Mutex};

struct Inner {
    lifecycle: LifecycleState,
    default_algorithm: String,
}

pub struct PostQuantumAlgorithms {
    registry: AlgorithmRegistry,
    inner: Mutex<Inner>,
    config: Config,
}

impl PostQuantumAlgorithms {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_registry(AlgorithmRegistry::builtin(), config)
    }

    /// Экземпляр над собственным реестром (дополнительные схемы)
    pub fn with_registry(registry: AlgorithmRegistry, config: Config) -> Self {
        Self {
            registry,
            inner: Mutex::new(Inner {
                lifecycle: LifecycleState::default(),
                default_algorithm: config.default_algorithm.clone(),
            }),
            config,
        }
    }

    /// Инициализация. Алгоритм по умолчанию из конфигурации должен быть
    /// зарегистрирован.
    pub fn initialize(&self) -> Result<()> {
        use tracing::debug;

        let mut inner = self.inner.lock()?;
        if inner.lifecycle == LifecycleState::Uninitialized
            && !self.registry.contains(&inner.default_algorithm)
        {
            return Err(QuantumError::UnknownAlgorithm(inner.default_algorithm.clone()));
        }
        inner.lifecycle.begin()?;

        debug!(
            target: "quantum::algorithms",
            algorithms = self.registry.len(),
            default = %inner.default_algorithm,
            "PostQuantumAlgorithms initialized"
        );
        Ok(())
    }

    pub fn shutdown(&self) -> Result<()> {
        use tracing::debug;

        if self.inner.lock()?.lifecycle.end() {
            debug!(target: "quantum::algorithms", "PostQuantumAlgorithms shut down");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.lifecycle.is_initialized())
            .unwrap_or(false)
    }

    fn ensure_initialized(&self) -> Result<()> {
        self.inner.lock()?.lifecycle.ensure_initialized()
    }

    fn scheme(&self, algorithm: &str) -> Result<Arc<dyn PqScheme>> {
        self.ensure_initialized()?;
        if algorithm.trim().is_empty() {
            return Err(QuantumError::invalid("algorithm name is empty"));
        }
        self.registry.scheme(algorithm)
    }

    pub fn generate_key_pair(&self, algorithm: &str) -> Result<KeyPair> {
        use tracing::trace;

        let pair = self.scheme(algorithm)?.generate_key_pair()?;
        trace!(
            target: "quantum::algorithms",
            algorithm,
            public_key_len = pair.public_key.len(),
            "Generated key pair"
        );
        Ok(pair)
    }

    pub fn sign(&self, algorithm: &str, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.scheme(algorithm)?.sign(private_key, data)
    }

    /// `Ok(false)` для несовпадающей подписи; ошибка для пустых или
    /// некорректных ключа, данных, подписи.
    pub fn verify(
        &self,
        algorithm: &str,
        public_key: &[u8],
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        self.scheme(algorithm)?.verify(public_key, data, signature)
    }

    /// Рандомизированное шифрование: повторные вызовы дают разные шифротексты
    pub fn encrypt(&self, algorithm: &str, public_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.scheme(algorithm)?.encrypt(public_key, data)
    }

    pub fn decrypt(&self, algorithm: &str, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.scheme(algorithm)?.decrypt(private_key, data)
    }

    pub fn get_algorithm_info(&self, name: &str) -> Result<AlgorithmInfo> {
        self.ensure_initialized()?;
        self.registry.info(name).cloned()
    }

    pub fn get_available_algorithms(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        Ok(self.registry.names())
    }

    pub fn get_recommended_algorithms(&self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        Ok(self.registry.recommended_names())
    }

    pub fn is_algorithm_available(&self, name: &str) -> Result<bool> {
        self.ensure_initialized()?;
        Ok(self.registry.contains(name))
    }

    pub fn is_algorithm_recommended(&self, name: &str) -> Result<bool> {
        self.ensure_initialized()?;
        Ok(self
            .registry
            .info(name)
            .map(|info| info.is_recommended)
            .unwrap_or(false))
    }

    pub fn get_algorithm_security_level(&self, name: &str) -> Result<u32> {
        Ok(self.get_algorithm_info(name)?.security_level)
    }

    pub fn get_algorithm_key_size(&self, name: &str) -> Result<u32> {
        Ok(self.get_algorithm_info(name)?.key_size)
    }

    pub fn get_algorithm_signature_size(&self, name: &str) -> Result<u32> {
        Ok(self.get_algorithm_info(name)?.signature_size)
    }

    pub fn get_default_algorithm(&self) -> Result<String> {
        let inner = self.inner.lock()?;
        inner.lifecycle.ensure_initialized()?;
        Ok(inner.default_algorithm.clone())
    }

    pub fn set_default_algorithm(&self, name: &str) -> Result<()> {
        use tracing::debug;

        let mut inner = self.inner.lock()?;
        inner.lifecycle.ensure_initialized()?;
        if !self.registry.contains(name) {
            return Err(QuantumError::UnknownAlgorithm(name.to_string()));
        }
        inner.default_algorithm = name.to_string();

        debug!(target: "quantum::algorithms", default = name, "Default algorithm changed");
        Ok(())
    }

    pub fn get_version(&self) -> Result<String> {
        self.ensure_initialized()?;
        Ok(self.config.version.clone())
    }
}

impl Default for PostQuantumAlgorithms {
    fn default() -> Self {
        Self::new()
    }
}
