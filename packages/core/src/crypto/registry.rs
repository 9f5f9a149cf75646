// Каталог пост-квантовых алгоритмов

use crate::crypto::provider::CryptoProvider;
use crate::crypto::scheme::{PqScheme, SuiteScheme};
use crate::crypto::suites::{
    HybridSuiteProvider, Kyber1024Dilithium5, Kyber512Dilithium2, Kyber768Dilithium3,
};
use crate::utils::error::{QuantumError, Result};
use std::sync::Arc;

/// Описание одного алгоритма
///
/// `key_size` - длина общего секрета/симметричного ключа в байтах,
/// `signature_size` - длина подписи в байтах.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub name: String,
    pub security_level: u32,
    pub key_size: u32,
    pub signature_size: u32,
    pub is_recommended: bool,
    pub description: String,
}

impl AlgorithmInfo {
    pub fn new(
        name: impl Into<String>,
        security_level: u32,
        key_size: u32,
        signature_size: u32,
        is_recommended: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            security_level,
            key_size,
            signature_size,
            is_recommended,
            description: description.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(QuantumError::invalid("algorithm name is empty"));
        }
        if self.security_level == 0 || self.key_size == 0 || self.signature_size == 0 {
            return Err(QuantumError::invalid(format!(
                "algorithm {} has a zero numeric field",
                self.name
            )));
        }
        Ok(())
    }
}

fn scheme_for<P: CryptoProvider>() -> Arc<dyn PqScheme> {
    Arc::new(SuiteScheme::<P>::new())
}

struct RegisteredAlgorithm {
    info: AlgorithmInfo,
    scheme: Arc<dyn PqScheme>,
}

/// Упорядоченный реестр: имя → (метаданные, реализация)
///
/// Порядок регистрации сохраняется и определяет порядок
/// `get_available_algorithms()`.
pub struct AlgorithmRegistry {
    entries: Vec<RegisteredAlgorithm>,
}

impl AlgorithmRegistry {
    /// Пустой реестр
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Встроенный каталог.
    ///
    /// NTRU исполняется решёточным набором первого уровня (Kyber512 +
    /// Dilithium2) с тем же профилем стойкости. Только-KEM семейства (HQC,
    /// BIKE, Classic McEliece) не подписывают и в каталог не входят;
    /// их можно добавить через [`Self::register`].
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let builtin: [(AlgorithmInfo, Arc<dyn PqScheme>); 4] = [
            (
                AlgorithmInfo::new(
                    "CRYSTALS-Kyber",
                    256,
                    32,
                    4595,
                    true,
                    "Module-lattice KEM (Kyber1024) with Dilithium5 signatures",
                ),
                scheme_for::<Kyber1024Dilithium5>(),
            ),
            (
                AlgorithmInfo::new(
                    "CRYSTALS-Dilithium",
                    192,
                    32,
                    3293,
                    true,
                    "Module-lattice signatures (Dilithium3) with Kyber768 encryption",
                ),
                scheme_for::<Kyber768Dilithium3>(),
            ),
            (
                AlgorithmInfo::new(
                    "Hybrid-X25519-Kyber768",
                    192,
                    32,
                    3357,
                    true,
                    "X25519 + Kyber768 KEM, Ed25519 + Dilithium3 signatures",
                ),
                scheme_for::<HybridSuiteProvider>(),
            ),
            (
                AlgorithmInfo::new(
                    "NTRU",
                    128,
                    32,
                    2420,
                    false,
                    "Level-1 lattice profile (Kyber512 + Dilithium2)",
                ),
                scheme_for::<Kyber512Dilithium2>(),
            ),
        ];

        for (info, scheme) in builtin {
            registry.entries.push(RegisteredAlgorithm { info, scheme });
        }
        registry
    }

    /// Зарегистрировать алгоритм. Имя должно быть уникальным, числовые поля > 0.
    pub fn register(&mut self, info: AlgorithmInfo, scheme: Arc<dyn PqScheme>) -> Result<()> {
        info.validate()?;
        if self.contains(&info.name) {
            return Err(QuantumError::invalid(format!(
                "algorithm {} is already registered",
                info.name
            )));
        }
        self.entries.push(RegisteredAlgorithm { info, scheme });
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&RegisteredAlgorithm> {
        self.entries.iter().find(|e| e.info.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn info(&self, name: &str) -> Result<&AlgorithmInfo> {
        self.entry(name)
            .map(|e| &e.info)
            .ok_or_else(|| QuantumError::UnknownAlgorithm(name.to_string()))
    }

    pub fn scheme(&self, name: &str) -> Result<Arc<dyn PqScheme>> {
        self.entry(name)
            .map(|e| Arc::clone(&e.scheme))
            .ok_or_else(|| QuantumError::UnknownAlgorithm(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.info.name.clone()).collect()
    }

    pub fn recommended_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.info.is_recommended)
            .map(|e| e.info.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::ClassicSuiteProvider;

    #[test]
    fn test_builtin_catalog_order() {
        let registry = AlgorithmRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec!["CRYSTALS-Kyber", "CRYSTALS-Dilithium", "Hybrid-X25519-Kyber768", "NTRU"]
        );
        assert!(!registry.recommended_names().contains(&"NTRU".to_string()));
    }

    #[test]
    fn test_register_rejects_duplicates_and_zero_fields() {
        let mut registry = AlgorithmRegistry::builtin();
        let scheme = scheme_for::<ClassicSuiteProvider>();

        let dup = AlgorithmInfo::new("NTRU", 1, 1, 1, false, "dup");
        assert!(registry.register(dup, Arc::clone(&scheme)).is_err());

        let zero = AlgorithmInfo::new("X25519", 128, 0, 64, false, "zero key size");
        assert!(registry.register(zero, Arc::clone(&scheme)).is_err());

        let ok = AlgorithmInfo::new("X25519", 128, 32, 64, false, "classic");
        registry.register(ok, scheme).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.names().last().map(String::as_str), Some("X25519"));
    }

    #[test]
    fn test_unknown_name() {
        let registry = AlgorithmRegistry::builtin();
        assert!(matches!(registry.info("RSA"), Err(QuantumError::UnknownAlgorithm(_))));
        assert!(registry.scheme("RSA").is_err());
    }
}
