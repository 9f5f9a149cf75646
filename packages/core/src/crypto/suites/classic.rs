use crate::crypto::provider::CryptoProvider;
use crate::crypto::CLASSIC_SUITE_ID;
use crate::error::CryptoError;
use chacha20poly1305::{
    aead::{Aead, Payload},
    ChaCha20Poly1305, Key as AeadKeyChacha, KeyInit, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand_core::RngCore;
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey as KemPublicKeyDalek, StaticSecret};

pub(crate) const X25519_KEY_LENGTH: usize = 32;
pub(crate) const ED25519_KEY_LENGTH: usize = 32;
pub(crate) const ED25519_SIGNATURE_LENGTH: usize = 64;
const CHACHA_KEY_LENGTH: usize = 32;
const CHACHA_NONCE_LENGTH: usize = 12;

/// Concrete implementation of `CryptoProvider` for the classic suite.
///
/// X25519 KEM (ephemeral-static DH), Ed25519 signatures, ChaCha20-Poly1305,
/// HKDF-SHA256. The lattice and hybrid suites reuse its AEAD/KDF half.
pub struct ClassicSuiteProvider;

impl ClassicSuiteProvider {
    pub(crate) fn x25519_secret(bytes: &[u8]) -> Result<StaticSecret, CryptoError> {
        let bytes: [u8; X25519_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid KEM private key length".to_string()))?;
        Ok(StaticSecret::from(bytes))
    }

    pub(crate) fn x25519_public(bytes: &[u8]) -> Result<KemPublicKeyDalek, CryptoError> {
        let bytes: [u8; X25519_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid KEM public key length".to_string()))?;
        Ok(KemPublicKeyDalek::from(bytes))
    }

    fn signing_key(bytes: &[u8]) -> Result<SigningKey, CryptoError> {
        let bytes: &[u8; ED25519_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid signing key length".to_string()))?;
        Ok(SigningKey::from_bytes(bytes))
    }

    fn cipher(key: &[u8]) -> Result<ChaCha20Poly1305, CryptoError> {
        if key.len() != CHACHA_KEY_LENGTH {
            return Err(CryptoError::InvalidInputError(format!(
                "Invalid AEAD key length: expected {}, got {}",
                CHACHA_KEY_LENGTH,
                key.len()
            )));
        }
        Ok(ChaCha20Poly1305::new(AeadKeyChacha::from_slice(key)))
    }

    fn nonce(nonce: &[u8]) -> Result<&Nonce, CryptoError> {
        if nonce.len() != CHACHA_NONCE_LENGTH {
            return Err(CryptoError::InvalidInputError(format!(
                "Invalid nonce length: expected {}, got {}",
                CHACHA_NONCE_LENGTH,
                nonce.len()
            )));
        }
        Ok(Nonce::from_slice(nonce))
    }
}

impl CryptoProvider for ClassicSuiteProvider {
    type KemPublicKey = Vec<u8>;
    type KemPrivateKey = Vec<u8>;
    type SignaturePublicKey = Vec<u8>;
    type SignaturePrivateKey = Vec<u8>;
    type AeadKey = Vec<u8>;

    fn generate_kem_keys() -> Result<(Self::KemPrivateKey, Self::KemPublicKey), CryptoError> {
        let private_key = StaticSecret::random_from_rng(OsRng);
        let public_key = KemPublicKeyDalek::from(&private_key);
        Ok((private_key.to_bytes().to_vec(), public_key.to_bytes().to_vec()))
    }

    fn kem_public_key_from_bytes(bytes: Vec<u8>) -> Self::KemPublicKey {
        bytes
    }

    fn kem_private_key_from_bytes(bytes: Vec<u8>) -> Self::KemPrivateKey {
        bytes
    }

    fn aead_key_from_bytes(bytes: Vec<u8>) -> Self::AeadKey {
        bytes
    }

    fn signature_public_key_from_bytes(bytes: Vec<u8>) -> Self::SignaturePublicKey {
        bytes
    }

    fn signature_private_key_from_bytes(bytes: Vec<u8>) -> Self::SignaturePrivateKey {
        bytes
    }

    fn generate_signature_keys(
    ) -> Result<(Self::SignaturePrivateKey, Self::SignaturePublicKey), CryptoError> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        Ok((
            signing_key.to_bytes().to_vec(),
            verifying_key.to_bytes().to_vec(),
        ))
    }

    fn sign(private_key: &Self::SignaturePrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signing_key = Self::signing_key(private_key)?;
        let signature = signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(
        public_key: &Self::SignaturePublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        let vk_bytes: &[u8; ED25519_KEY_LENGTH] = public_key
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidInputError("Invalid verifying key length".to_string()))?;
        let verifying_key = VerifyingKey::from_bytes(vk_bytes)
            .map_err(|e| CryptoError::InvalidInputError(format!("Invalid verifying key: {}", e)))?;

        // Подпись неправильной длины: несовпадение, а не некорректный ключ
        let sig_bytes: &[u8; ED25519_SIGNATURE_LENGTH] = signature
            .try_into()
            .map_err(|_| CryptoError::SignatureVerificationError("Invalid signature length".to_string()))?;
        let signature_obj = Signature::from_bytes(sig_bytes);

        verifying_key
            .verify(message, &signature_obj)
            .map_err(|e| CryptoError::SignatureVerificationError(e.to_string()))
    }

    fn kem_encapsulate(
        public_key: &Self::KemPublicKey,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let recipient_public_key = Self::x25519_public(public_key)?;
        let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);

        // Get ephemeral public key before consuming ephemeral_secret
        let ephemeral_public_key = KemPublicKeyDalek::from(&ephemeral_secret);
        let shared_secret = ephemeral_secret.diffie_hellman(&recipient_public_key);

        Ok((
            ephemeral_public_key.to_bytes().to_vec(),
            shared_secret.to_bytes().to_vec(),
        ))
    }

    fn kem_decapsulate(
        private_key: &Self::KemPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let static_secret = Self::x25519_secret(private_key)?;

        let ct_bytes: [u8; X25519_KEY_LENGTH] = ciphertext
            .try_into()
            .map_err(|_| CryptoError::KemDecapsulationError("Invalid KEM ciphertext length".to_string()))?;
        let ephemeral_public_key = KemPublicKeyDalek::from(ct_bytes);

        let shared_secret = static_secret.diffie_hellman(&ephemeral_public_key);
        Ok(shared_secret.to_bytes().to_vec())
    }

    fn aead_encrypt(
        key: &Self::AeadKey,
        nonce: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Self::cipher(key)?;
        let nonce_ref = Self::nonce(nonce)?;

        let payload = Payload {
            msg: plaintext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .encrypt(nonce_ref, payload)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))
    }

    fn aead_decrypt(
        key: &Self::AeadKey,
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Self::cipher(key)?;
        let nonce_ref = Self::nonce(nonce)?;

        let payload = Payload {
            msg: ciphertext,
            aad: associated_data.unwrap_or(b""),
        };

        cipher
            .decrypt(nonce_ref, payload)
            .map_err(|e| CryptoError::AeadDecryptionError(e.to_string()))
    }

    fn hkdf_derive_key(
        salt: &[u8],
        ikm: &[u8],
        info: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, CryptoError> {
        let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = vec![0u8; len];
        hkdf.expand(info, &mut okm)
            .map_err(|e| CryptoError::KeyDerivationError(e.to_string()))?;
        Ok(okm)
    }

    fn generate_nonce(len: usize) -> Result<Vec<u8>, CryptoError> {
        let mut nonce_bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut nonce_bytes);
        Ok(nonce_bytes)
    }

    fn suite_id() -> u16 {
        CLASSIC_SUITE_ID
    }

    fn suite_name() -> &'static str {
        "X25519/Ed25519"
    }
}
