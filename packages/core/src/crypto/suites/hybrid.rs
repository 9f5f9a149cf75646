use crate::crypto::provider::CryptoProvider;
use crate::crypto::suites::classic::{
    ClassicSuiteProvider, ED25519_KEY_LENGTH, ED25519_SIGNATURE_LENGTH, X25519_KEY_LENGTH,
};
use crate::crypto::suites::lattice::Kyber768Dilithium3;
use crate::crypto::PQ_HYBRID_SUITE_ID;
use crate::error::CryptoError;
use zeroize::Zeroizing;

const HYBRID_KEM_INFO: &[u8] = b"satox-hybrid-kem-x25519-kyber768";
const SHARED_SECRET_LENGTH: usize = 32;

/// Hybrid suite: X25519 + Kyber768 KEM, Ed25519 + Dilithium3 signatures.
///
/// Every hybrid value is `classical || post-quantum`; the classical half has a
/// fixed length, so no framing is needed. Both shared secrets feed one HKDF
/// (salted with the full KEM ciphertext); both signatures must verify.
pub struct HybridSuiteProvider;

fn split_at_checked<'a>(
    bytes: &'a [u8],
    mid: usize,
    what: &str,
) -> Result<(&'a [u8], &'a [u8]), CryptoError> {
    if bytes.len() <= mid {
        return Err(CryptoError::InvalidInputError(format!(
            "Invalid hybrid {} length: {}",
            what,
            bytes.len()
        )));
    }
    Ok(bytes.split_at(mid))
}

fn concat(classical: &[u8], post_quantum: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(classical.len() + post_quantum.len());
    out.extend_from_slice(classical);
    out.extend_from_slice(post_quantum);
    out
}

impl CryptoProvider for HybridSuiteProvider {
    type KemPublicKey = Vec<u8>;
    type KemPrivateKey = Vec<u8>;
    type SignaturePublicKey = Vec<u8>;
    type SignaturePrivateKey = Vec<u8>;
    type AeadKey = Vec<u8>;

    fn generate_kem_keys() -> Result<(Self::KemPrivateKey, Self::KemPublicKey), CryptoError> {
        let (x_sk, x_pk) = ClassicSuiteProvider::generate_kem_keys()?;
        let x_sk = Zeroizing::new(x_sk);
        let (k_sk, k_pk) = Kyber768Dilithium3::generate_kem_keys()?;
        let k_sk = Zeroizing::new(k_sk);
        Ok((concat(&x_sk, &k_sk), concat(&x_pk, &k_pk)))
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
        let (e_sk, e_pk) = ClassicSuiteProvider::generate_signature_keys()?;
        let e_sk = Zeroizing::new(e_sk);
        let (d_sk, d_pk) = Kyber768Dilithium3::generate_signature_keys()?;
        let d_sk = Zeroizing::new(d_sk);
        Ok((concat(&e_sk, &d_sk), concat(&e_pk, &d_pk)))
    }

    fn sign(private_key: &Self::SignaturePrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (e_sk, d_sk) = split_at_checked(private_key, ED25519_KEY_LENGTH, "signing key")?;
        let e_sk = Zeroizing::new(e_sk.to_vec());
        let d_sk = Zeroizing::new(d_sk.to_vec());
        let e_sig = ClassicSuiteProvider::sign(&e_sk, message)?;
        let d_sig = Kyber768Dilithium3::sign(&d_sk, message)?;
        Ok(concat(&e_sig, &d_sig))
    }

    fn verify(
        public_key: &Self::SignaturePublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError> {
        let (e_pk, d_pk) = split_at_checked(public_key, ED25519_KEY_LENGTH, "verifying key")?;
        if signature.len() <= ED25519_SIGNATURE_LENGTH {
            return Err(CryptoError::SignatureVerificationError(
                "Invalid signature length".to_string(),
            ));
        }
        let (e_sig, d_sig) = signature.split_at(ED25519_SIGNATURE_LENGTH);
        ClassicSuiteProvider::verify(&e_pk.to_vec(), message, e_sig)?;
        Kyber768Dilithium3::verify(&d_pk.to_vec(), message, d_sig)
    }

    fn kem_encapsulate(
        public_key: &Self::KemPublicKey,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let (x_pk, k_pk) = split_at_checked(public_key, X25519_KEY_LENGTH, "KEM public key")?;
        let (x_ct, x_ss) = ClassicSuiteProvider::kem_encapsulate(&x_pk.to_vec())?;
        let x_ss = Zeroizing::new(x_ss);
        let (k_ct, k_ss) = Kyber768Dilithium3::kem_encapsulate(&k_pk.to_vec())?;
        let k_ss = Zeroizing::new(k_ss);

        let ciphertext = concat(&x_ct, &k_ct);
        let ikm = Zeroizing::new(concat(&x_ss, &k_ss));
        let shared_secret =
            Self::hkdf_derive_key(&ciphertext, &ikm, HYBRID_KEM_INFO, SHARED_SECRET_LENGTH)?;
        Ok((ciphertext, shared_secret))
    }

    fn kem_decapsulate(
        private_key: &Self::KemPrivateKey,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let (x_sk, k_sk) = split_at_checked(private_key, X25519_KEY_LENGTH, "KEM private key")?;
        if ciphertext.len() != X25519_KEY_LENGTH + Kyber768Dilithium3::kem_ciphertext_len() {
            return Err(CryptoError::KemDecapsulationError(
                "Invalid hybrid KEM ciphertext length".to_string(),
            ));
        }
        let (x_ct, k_ct) = ciphertext.split_at(X25519_KEY_LENGTH);

        let x_sk = Zeroizing::new(x_sk.to_vec());
        let k_sk = Zeroizing::new(k_sk.to_vec());
        let x_ss = Zeroizing::new(ClassicSuiteProvider::kem_decapsulate(&x_sk, x_ct)?);
        let k_ss = Zeroizing::new(Kyber768Dilithium3::kem_decapsulate(&k_sk, k_ct)?);
        let ikm = Zeroizing::new(concat(&x_ss, &k_ss));
        Self::hkdf_derive_key(ciphertext, &ikm, HYBRID_KEM_INFO, SHARED_SECRET_LENGTH)
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
        PQ_HYBRID_SUITE_ID
    }

    fn suite_name() -> &'static str {
        "X25519+Kyber768/Ed25519+Dilithium3"
    }
}
