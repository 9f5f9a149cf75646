// Мастер-ключи и обёртка ключевого материала
// PBKDF2 для деривации ключа из пароля + AES-256-GCM для шифрования

use crate::config::Config;
use crate::utils::error::{QuantumError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

// Размеры массивов: соль и ключ PBKDF2 / AES-256-GCM, nonce GCM
pub const SALT_LENGTH: usize = 32;
pub const KEY_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;

/// Деривировать мастер-ключ из пароля с использованием PBKDF2
///
/// # Arguments
/// * `password` - Пользовательский пароль
/// * `salt` - Соль (32 байта)
/// * `config` - источник количества итераций
///
/// # Returns
/// 256-битный ключ для AES-256-GCM
pub fn derive_master_key(
    password: &str,
    salt: &[u8],
    config: &Config,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    if salt.len() != SALT_LENGTH {
        return Err(QuantumError::invalid(format!(
            "Invalid salt length: expected {}, got {}",
            SALT_LENGTH,
            salt.len()
        )));
    }

    if password.is_empty() {
        return Err(QuantumError::invalid("Password cannot be empty"));
    }

    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);

    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, config.pbkdf2_iterations, &mut *key);

    Ok(key)
}

/// Генерировать случайную соль
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Случайный 256-битный ключ (мастер-ключ хранилища, ключ записи)
pub fn generate_key() -> Zeroizing<[u8; KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    rand::rngs::OsRng.fill_bytes(&mut *key);
    key
}

/// Зашифровать данные с использованием AES-256-GCM
///
/// Формат результата: `nonce (12) || ciphertext || tag (16)`.
/// `aad` аутентифицируется, но не шифруется.
pub fn encrypt_data(key: &[u8; KEY_LENGTH], data: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.into());

    // Генерируем случайный nonce
    let mut nonce_bytes = [0u8; NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, Payload { msg: data, aad })
        .map_err(|e| QuantumError::failed(format!("Encryption failed: {}", e)))?;

    // Комбинируем nonce + ciphertext
    let mut result = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Расшифровать данные с использованием AES-256-GCM
pub fn decrypt_data(key: &[u8; KEY_LENGTH], data: &[u8], aad: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if data.len() < NONCE_LENGTH {
        return Err(QuantumError::invalid("Invalid ciphertext: too short"));
    }

    let cipher = Aes256Gcm::new(key.into());

    // Извлекаем nonce и ciphertext
    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LENGTH);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, Payload { msg: ciphertext, aad })
        .map_err(|e| QuantumError::failed(format!("Decryption failed: {}", e)))?;

    Ok(Zeroizing::new(plaintext))
}

/// Конвертировать срез в [u8; 32]
pub fn to_key_array(bytes: &[u8]) -> Result<Zeroizing<[u8; KEY_LENGTH]>> {
    if bytes.len() != KEY_LENGTH {
        return Err(QuantumError::invalid(format!(
            "Invalid key length: expected {}, got {}",
            KEY_LENGTH,
            bytes.len()
        )));
    }

    let mut array = Zeroizing::new([0u8; KEY_LENGTH]);
    array.copy_from_slice(bytes);
    Ok(array)
}

/// Валидация силы пароля
///
/// Минимальные требования:
/// - Длина >= конфигурируемый минимум (по умолчанию 8 символов)
/// - Содержит буквы и цифры
pub fn validate_password(password: &str, config: &Config) -> Result<()> {
    let min_length = config.password_min_length;
    if password.chars().count() < min_length {
        return Err(QuantumError::invalid(format!(
            "Password must be at least {} characters long",
            min_length
        )));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_numeric());

    if !has_letter || !has_digit {
        return Err(QuantumError::invalid(
            "Password must contain both letters and numbers",
        ));
    }

    Ok(())
}
