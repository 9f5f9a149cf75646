//! Централизованная конфигурация для Satox Quantum Core
//!
//! Все константы и настройки подсистемы определены здесь, чтобы избежать
//! хардкода по всему проекту. Экземпляр `Config` передаётся компонентам
//! явно (`with_config`), глобального состояния нет.

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================

    /// PBKDF2: количество итераций для деривации ключа резервной копии из пароля
    pub pbkdf2_iterations: u32,

    /// Длина nonce для ChaCha20Poly1305 (в байтах)
    pub chacha_nonce_length: usize,

    /// Длина сеансового ключа HybridEncryption (в байтах)
    pub session_key_length: usize,

    // ============================================
    // АЛГОРИТМЫ
    // ============================================

    /// Алгоритм по умолчанию для PostQuantumAlgorithms
    pub default_algorithm: String,

    /// Версия подсистемы, возвращаемая get_version()
    pub version: String,

    // ============================================
    // ОГРАНИЧЕНИЯ
    // ============================================

    /// Максимальный размер метаданных ключа в JSON (в байтах)
    pub max_metadata_bytes: usize,

    /// Максимальная длина запроса generate_random_bytes
    pub max_random_bytes: usize,

    /// Автоматическая ротация сеансового ключа после N шифрований (0 = выключено)
    pub session_key_max_messages: u64,

    /// Минимальная длина пароля резервной копии
    pub password_min_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Криптография
            pbkdf2_iterations: 100_000,
            chacha_nonce_length: 12,
            session_key_length: 32,

            // Алгоритмы
            default_algorithm: "CRYSTALS-Kyber".to_string(),
            version: "1.0.0".to_string(),

            // Ограничения
            max_metadata_bytes: 1024,
            max_random_bytes: 1024 * 1024,
            session_key_max_messages: 0,
            password_min_length: 8,
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Переопределяем значения из env, если они заданы
        if let Ok(val) = std::env::var("SATOX_PBKDF2_ITERATIONS") {
            if let Ok(parsed) = val.parse() {
                config.pbkdf2_iterations = parsed;
            }
        }

        if let Ok(val) = std::env::var("SATOX_DEFAULT_ALGORITHM") {
            if !val.trim().is_empty() {
                config.default_algorithm = val.trim().to_string();
            }
        }

        if let Ok(val) = std::env::var("SATOX_MAX_METADATA_BYTES") {
            if let Ok(parsed) = val.parse() {
                config.max_metadata_bytes = parsed;
            }
        }

        if let Ok(val) = std::env::var("SATOX_SESSION_KEY_MAX_MESSAGES") {
            if let Ok(parsed) = val.parse() {
                config.session_key_max_messages = parsed;
            }
        }

        config
    }

    /// Конфигурация для тестов: меньше итераций PBKDF2
    pub fn for_tests() -> Self {
        Self {
            pbkdf2_iterations: 1_000,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pbkdf2_iterations, 100_000);
        assert_eq!(config.default_algorithm, "CRYSTALS-Kyber");
        assert_eq!(config.max_metadata_bytes, 1024);
    }

    #[test]
    fn test_config_values() {
        let config = Config::default();

        // Crypto params
        assert_eq!(config.chacha_nonce_length, 12);
        assert_eq!(config.session_key_length, 32);

        // Rotation is opt-in
        assert_eq!(config.session_key_max_messages, 0);
    }

    #[test]
    fn test_config_for_tests_keeps_other_defaults() {
        let config = Config::for_tests();
        assert_eq!(config.pbkdf2_iterations, 1_000);
        assert_eq!(config.version, "1.0.0");
    }
}
