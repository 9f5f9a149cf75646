//! Решёточные наборы: CRYSTALS-Kyber (KEM) + CRYSTALS-Dilithium (подписи).
//!
//! Три набора параметров генерируются одним макросом; симметричная часть
//! (ChaCha20-Poly1305, HKDF-SHA256) общая с [`ClassicSuiteProvider`].

use crate::crypto::provider::CryptoProvider;
use crate::crypto::suites::classic::ClassicSuiteProvider;
use crate::crypto::{LATTICE_L1_SUITE_ID, LATTICE_L3_SUITE_ID, LATTICE_L5_SUITE_ID};
use crate::error::CryptoError;
use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _,
};

macro_rules! lattice_suite {
    ($(#[$meta:meta])* $name:ident, $kem:ident, $sig:ident, $suite_id:expr, $suite_name:expr) => {
        $(#[$meta])*
        pub struct $name;

        impl $name {
            /// Размер KEM-шифротекста в байтах
            pub fn kem_ciphertext_len() -> usize {
                pqcrypto_kyber::$kem::ciphertext_bytes()
            }

            /// Размер подписи в байтах
            pub fn signature_len() -> usize {
                pqcrypto_dilithium::$sig::signature_bytes()
            }
        }

        impl CryptoProvider for $name {
            type KemPublicKey = Vec<u8>;
            type KemPrivateKey = Vec<u8>;
            type SignaturePublicKey = Vec<u8>;
            type SignaturePrivateKey = Vec<u8>;
            type AeadKey = Vec<u8>;

            fn generate_kem_keys() -> Result<(Self::KemPrivateKey, Self::KemPublicKey), CryptoError> {
                let (pk, sk) = pqcrypto_kyber::$kem::keypair();
                Ok((sk.as_bytes().to_vec(), pk.as_bytes().to_vec()))
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
                let (pk, sk) = pqcrypto_dilithium::$sig::keypair();
                Ok((sk.as_bytes().to_vec(), pk.as_bytes().to_vec()))
            }

            fn sign(private_key: &Self::SignaturePrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
                let sk = pqcrypto_dilithium::$sig::SecretKey::from_bytes(private_key)
                    .map_err(|_| CryptoError::InvalidInputError("Invalid Dilithium secret key bytes".to_string()))?;
                let signature = pqcrypto_dilithium::$sig::detached_sign(message, &sk);
                Ok(signature.as_bytes().to_vec())
            }

            fn verify(
                public_key: &Self::SignaturePublicKey,
                message: &[u8],
                signature: &[u8],
            ) -> Result<(), CryptoError> {
                let pk = pqcrypto_dilithium::$sig::PublicKey::from_bytes(public_key)
                    .map_err(|_| CryptoError::InvalidInputError("Invalid Dilithium public key bytes".to_string()))?;
                let sig = pqcrypto_dilithium::$sig::DetachedSignature::from_bytes(signature)
                    .map_err(|_| CryptoError::SignatureVerificationError("Invalid signature length".to_string()))?;
                pqcrypto_dilithium::$sig::verify_detached_signature(&sig, message, &pk)
                    .map_err(|e| CryptoError::SignatureVerificationError(format!("{:?}", e)))
            }

            fn kem_encapsulate(
                public_key: &Self::KemPublicKey,
            ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
                let pk = pqcrypto_kyber::$kem::PublicKey::from_bytes(public_key)
                    .map_err(|_| CryptoError::InvalidInputError("Invalid Kyber public key bytes".to_string()))?;
                let (ss, ct) = pqcrypto_kyber::$kem::encapsulate(&pk);
                Ok((ct.as_bytes().to_vec(), ss.as_bytes().to_vec()))
            }

            fn kem_decapsulate(
                private_key: &Self::KemPrivateKey,
                ciphertext: &[u8],
            ) -> Result<Vec<u8>, CryptoError> {
                let sk = pqcrypto_kyber::$kem::SecretKey::from_bytes(private_key)
                    .map_err(|_| CryptoError::InvalidInputError("Invalid Kyber secret key bytes".to_string()))?;
                let ct = pqcrypto_kyber::$kem::Ciphertext::from_bytes(ciphertext)
                    .map_err(|_| CryptoError::KemDecapsulationError("Invalid Kyber ciphertext bytes".to_string()))?;
                let ss = pqcrypto_kyber::$kem::decapsulate(&ct, &sk);
                Ok(ss.as_bytes().to_vec())
            }

            fn aead_encrypt(
                key: &Self::AeadKey,
                nonce: &[u8],
                plaintext: &[u8],
                associated_data: Option<&[u8]>,
            ) -> Result<Vec<u8>, CryptoError> {
                ClassicSuiteProvider::aead_encrypt(key, nonce, plaintext, associated_data)
            }

            fn aead_decrypt(
                key: &Self::AeadKey,
                nonce: &[u8],
                ciphertext: &[u8],
                associated_data: Option<&[u8]>,
            ) -> Result<Vec<u8>, CryptoError> {
                ClassicSuiteProvider::aead_decrypt(key, nonce, ciphertext, associated_data)
            }

            fn hkdf_derive_key(
                salt: &[u8],
                ikm: &[u8],
                info: &[u8],
                len: usize,
            ) -> Result<Vec<u8>, CryptoError> {
                ClassicSuiteProvider::hkdf_derive_key(salt, ikm, info, len)
            }

            fn generate_nonce(len: usize) -> Result<Vec<u8>, CryptoError> {
                ClassicSuiteProvider::generate_nonce(len)
            }

            fn suite_id() -> u16 {
                $suite_id
            }

            fn suite_name() -> &'static str {
                $suite_name
            }
        }
    };
}

lattice_suite!(
    /// NIST level 1: Kyber512 + Dilithium2
    Kyber512Dilithium2,
    kyber512,
    dilithium2,
    LATTICE_L1_SUITE_ID,
    "Kyber512/Dilithium2"
);

lattice_suite!(
    /// NIST level 3: Kyber768 + Dilithium3
    Kyber768Dilithium3,
    kyber768,
    dilithium3,
    LATTICE_L3_SUITE_ID,
    "Kyber768/Dilithium3"
);

lattice_suite!(
    /// NIST level 5: Kyber1024 + Dilithium5
    Kyber1024Dilithium5,
    kyber1024,
    dilithium5,
    LATTICE_L5_SUITE_ID,
    "Kyber1024/Dilithium5"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kyber768_kem_roundtrip() {
        let (sk, pk) = Kyber768Dilithium3::generate_kem_keys().unwrap();
        let (ct, ss1) = Kyber768Dilithium3::kem_encapsulate(&pk).unwrap();
        assert_eq!(ct.len(), Kyber768Dilithium3::kem_ciphertext_len());
        let ss2 = Kyber768Dilithium3::kem_decapsulate(&sk, &ct).unwrap();
        assert_eq!(ss1, ss2);
    }

    #[test]
    fn test_dilithium5_sign_verify() {
        let (sk, pk) = Kyber1024Dilithium5::generate_signature_keys().unwrap();
        let sig = Kyber1024Dilithium5::sign(&sk, b"block header").unwrap();
        assert_eq!(sig.len(), Kyber1024Dilithium5::signature_len());
        assert!(Kyber1024Dilithium5::verify(&pk, b"block header", &sig).is_ok());
        assert!(matches!(
            Kyber1024Dilithium5::verify(&pk, b"other header", &sig),
            Err(CryptoError::SignatureVerificationError(_))
        ));
    }

    #[test]
    fn test_malformed_public_key_is_input_error() {
        let result = Kyber512Dilithium2::kem_encapsulate(&vec![1u8; 7]);
        assert!(matches!(result, Err(CryptoError::InvalidInputError(_))));
    }

    #[test]
    fn test_suite_ids_are_distinct() {
        assert_ne!(Kyber512Dilithium2::suite_id(), Kyber768Dilithium3::suite_id());
        assert_ne!(Kyber768Dilithium3::suite_id(), Kyber1024Dilithium5::suite_id());
    }
}
