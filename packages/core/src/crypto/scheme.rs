//! Объектно-безопасный фасад над CryptoProvider
//!
//! `CryptoProvider` работает со статическими методами и ассоциированными
//! типами, поэтому его нельзя положить в реестр как `dyn`. [`PqScheme`]
//! принимает и возвращает непрозрачные байты, а [`SuiteScheme`] реализует его
//! для любого набора.
//!
//! ## Форматы (bincode)
//!
//! ```text
//! ключ:        EncodedKey { suite_id, kind, kem, sig }
//! шифротекст:  Envelope   { suite_id, kem_ciphertext, nonce, ciphertext }
//! ```
//!
//! Шифрование рандомизировано: на каждый вызов новая инкапсуляция KEM и
//! новый nonce, поэтому два шифротекста одного сообщения различаются.

use crate::crypto::keys::KeyPair;
use crate::crypto::provider::CryptoProvider;
use crate::crypto::SuiteID;
use crate::error::CryptoError;
use crate::utils::error::{QuantumError, Result};
use crate::utils::serialization;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const ENVELOPE_KEY_INFO: &[u8] = b"satox-envelope-aead-key";
const AEAD_KEY_LENGTH: usize = 32;
const AEAD_NONCE_LENGTH: usize = 12;
const PAIR_CHECK_MESSAGE: &[u8] = b"satox-key-pair-check";

/// Операции одного алгоритма над непрозрачными байтами
pub trait PqScheme: Send + Sync {
    /// Имя набора примитивов, например `"Kyber768/Dilithium3"`
    fn suite_name(&self) -> &'static str;

    fn suite_id(&self) -> SuiteID;

    fn generate_key_pair(&self) -> Result<KeyPair>;

    fn encrypt(&self, public_key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;

    fn sign(&self, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// `Ok(false)` для несовпадающей подписи, ошибка для некорректного ввода
    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Public,
    Private,
}

impl KeyKind {
    fn label(self) -> &'static str {
        match self {
            KeyKind::Public => "public key",
            KeyKind::Private => "private key",
        }
    }
}

/// Закодированная половина KeyPair: KEM-ключ и ключ подписи одного набора
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct EncodedKey {
    suite_id: u16,
    #[zeroize(skip)]
    kind: KeyKind,
    #[serde(with = "serde_bytes")]
    kem: Vec<u8>,
    #[serde(with = "serde_bytes")]
    sig: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    suite_id: u16,
    #[serde(with = "serde_bytes")]
    kem_ciphertext: Vec<u8>,
    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    ciphertext: Vec<u8>,
}

/// [`PqScheme`] поверх набора `P`
pub struct SuiteScheme<P: CryptoProvider> {
    _phantom: PhantomData<P>,
}

impl<P: CryptoProvider> SuiteScheme<P> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    fn decode_key(&self, bytes: &[u8], expected: KeyKind) -> Result<EncodedKey> {
        if bytes.is_empty() {
            return Err(QuantumError::invalid(format!("{} is empty", expected.label())));
        }
        let key: EncodedKey = serialization::from_bytes(bytes)
            .map_err(|_| QuantumError::invalid(format!("malformed {}", expected.label())))?;
        if key.suite_id != P::suite_id() {
            return Err(QuantumError::invalid(format!(
                "{} belongs to suite {}, expected {}",
                expected.label(),
                key.suite_id,
                P::suite_id()
            )));
        }
        if key.kind != expected {
            return Err(QuantumError::invalid(format!(
                "expected {}, got {}",
                expected.label(),
                key.kind.label()
            )));
        }
        Ok(key)
    }

    fn envelope_key(kem_ciphertext: &[u8], shared_secret: &[u8]) -> Result<P::AeadKey> {
        let okm = Zeroizing::new(P::hkdf_derive_key(
            kem_ciphertext,
            shared_secret,
            ENVELOPE_KEY_INFO,
            AEAD_KEY_LENGTH,
        )?);
        Ok(P::aead_key_from_bytes(okm.to_vec()))
    }

    /// Инкапсуляция общего секрета под публичный ключ пары.
    ///
    /// Возвращает KEM-шифротекст для получателя и сам секрет.
    pub fn encapsulate(&self, public_key: &[u8]) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        let key = self.decode_key(public_key, KeyKind::Public)?;
        let (kem_ciphertext, shared_secret) =
            P::kem_encapsulate(&P::kem_public_key_from_bytes(key.kem.clone()))?;
        Ok((kem_ciphertext, Zeroizing::new(shared_secret)))
    }

    /// Обратная операция к [`Self::encapsulate`]
    pub fn decapsulate(&self, private_key: &[u8], kem_ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.decode_key(private_key, KeyKind::Private)?;
        if kem_ciphertext.is_empty() {
            return Err(QuantumError::invalid("KEM ciphertext is empty"));
        }
        let shared_secret =
            P::kem_decapsulate(&P::kem_private_key_from_bytes(key.kem.clone()), kem_ciphertext)?;
        Ok(Zeroizing::new(shared_secret))
    }

    /// Проверить, что половины составляют одну пару этого набора.
    ///
    /// Пустая половина - ошибка. Ключ чужого набора, перепутанные половины
    /// или ключи из разных пар дают `Ok(false)`.
    pub fn matches_key_pair(&self, public_key: &[u8], private_key: &[u8]) -> Result<bool> {
        use tracing::debug;

        if public_key.is_empty() || private_key.is_empty() {
            return Err(QuantumError::invalid("key pair halves must be non-empty"));
        }
        let (public, private) = match (
            self.decode_key(public_key, KeyKind::Public),
            self.decode_key(private_key, KeyKind::Private),
        ) {
            (Ok(public), Ok(private)) => (public, private),
            (Err(e), _) | (_, Err(e)) => {
                debug!(target: "quantum::algorithms", error = %e, "Key pair rejected");
                return Ok(false);
            }
        };

        // KEM: секрет, закрытый публичной половиной, раскрывается приватной
        let kem_matches = P::kem_encapsulate(&P::kem_public_key_from_bytes(public.kem.clone()))
            .and_then(|(kem_ciphertext, sent)| {
                let sent = Zeroizing::new(sent);
                let received = Zeroizing::new(P::kem_decapsulate(
                    &P::kem_private_key_from_bytes(private.kem.clone()),
                    &kem_ciphertext,
                )?);
                Ok(sent == received)
            })
            .unwrap_or(false);
        if !kem_matches {
            return Ok(false);
        }

        let sig_matches = P::sign(
            &P::signature_private_key_from_bytes(private.sig.clone()),
            PAIR_CHECK_MESSAGE,
        )
        .and_then(|signature| {
            P::verify(
                &P::signature_public_key_from_bytes(public.sig.clone()),
                PAIR_CHECK_MESSAGE,
                &signature,
            )
        })
        .is_ok();
        Ok(sig_matches)
    }
}

impl<P: CryptoProvider> Default for SuiteScheme<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: CryptoProvider> PqScheme for SuiteScheme<P> {
    fn suite_name(&self) -> &'static str {
        P::suite_name()
    }

    fn suite_id(&self) -> SuiteID {
        P::suite_id()
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let (kem_sk, kem_pk) = P::generate_kem_keys()?;
        let (sig_sk, sig_pk) = P::generate_signature_keys()?;

        let public = EncodedKey {
            suite_id: P::suite_id(),
            kind: KeyKind::Public,
            kem: kem_pk.as_ref().to_vec(),
            sig: sig_pk.as_ref().to_vec(),
        };
        let private = EncodedKey {
            suite_id: P::suite_id(),
            kind: KeyKind::Private,
            kem: kem_sk.as_ref().to_vec(),
            sig: sig_sk.as_ref().to_vec(),
        };

        KeyPair::new(
            serialization::to_bytes(&public)?,
            serialization::to_bytes(&private)?,
        )
    }

    fn encrypt(&self, public_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let (kem_ciphertext, shared_secret) = self.encapsulate(public_key)?;
        let aead_key = Self::envelope_key(&kem_ciphertext, &shared_secret)?;
        let nonce = P::generate_nonce(AEAD_NONCE_LENGTH)?;
        let aad = P::suite_id().to_le_bytes();

        let ciphertext = P::aead_encrypt(&aead_key, &nonce, data, Some(aad.as_slice()))?;

        let envelope = Envelope {
            suite_id: P::suite_id(),
            kem_ciphertext,
            nonce,
            ciphertext,
        };
        Ok(serialization::to_bytes(&envelope)?)
    }

    fn decrypt(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.is_empty() {
            return Err(QuantumError::invalid("ciphertext is empty"));
        }
        let envelope: Envelope = serialization::from_bytes(ciphertext)
            .map_err(|_| QuantumError::invalid("malformed ciphertext"))?;
        if envelope.suite_id != P::suite_id() {
            return Err(QuantumError::invalid(format!(
                "ciphertext belongs to suite {}, expected {}",
                envelope.suite_id,
                P::suite_id()
            )));
        }

        let shared_secret = self.decapsulate(private_key, &envelope.kem_ciphertext)?;
        let aead_key = Self::envelope_key(&envelope.kem_ciphertext, &shared_secret)?;
        let aad = P::suite_id().to_le_bytes();

        // Неверный ключ или порча данных проявляются здесь
        P::aead_decrypt(&aead_key, &envelope.nonce, &envelope.ciphertext, Some(aad.as_slice()))
            .map_err(|e| match e {
                CryptoError::InvalidInputError(msg) => QuantumError::invalid(msg),
                other => QuantumError::failed(other.to_string()),
            })
    }

    fn sign(&self, private_key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let key = self.decode_key(private_key, KeyKind::Private)?;
        if data.is_empty() {
            return Err(QuantumError::invalid("data to sign is empty"));
        }
        Ok(P::sign(&P::signature_private_key_from_bytes(key.sig.clone()), data)?)
    }

    fn verify(&self, public_key: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
        let key = self.decode_key(public_key, KeyKind::Public)?;
        if data.is_empty() {
            return Err(QuantumError::invalid("signed data is empty"));
        }
        if signature.is_empty() {
            return Err(QuantumError::invalid("signature is empty"));
        }

        match P::verify(&P::signature_public_key_from_bytes(key.sig.clone()), data, signature) {
            Ok(()) => Ok(true),
            Err(CryptoError::SignatureVerificationError(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
