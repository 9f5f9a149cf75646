//! Криптографические наборы (Crypto Suites)
//!
//! Этот модуль содержит различные реализации CryptoProvider trait.
//!
//! ## Доступные наборы
//!
//! ### Classic Suite
//! - **KEM**: X25519 (ECDH на Curve25519)
//! - **Signatures**: Ed25519
//! - **AEAD**: ChaCha20-Poly1305
//! - **KDF**: HKDF-SHA256
//! - **Suite ID**: 1
//!
//! ### Hybrid Suite (по умолчанию для QuantumManager и HybridEncryption)
//! - **KEM**: X25519 + Kyber768
//! - **Signatures**: Ed25519 + Dilithium3
//! - **Suite ID**: 2
//!
//! ### Lattice Suites
//! - Kyber512 + Dilithium2 (ID 3), Kyber768 + Dilithium3 (ID 4),
//!   Kyber1024 + Dilithium5 (ID 5)
//!
//! Симметричная часть (ChaCha20-Poly1305, HKDF-SHA256) у всех наборов общая.
//!
//! ## Выбор suite
//!
//! ```rust
//! use satox_quantum::crypto::suites::hybrid::HybridSuiteProvider;
//! use satox_quantum::crypto::provider::CryptoProvider;
//!
//! type MySuite = HybridSuiteProvider;
//!
//! let (private_key, public_key) = MySuite::generate_kem_keys().unwrap();
//! assert!(!private_key.is_empty() && !public_key.is_empty());
//! ```

pub mod classic;
pub mod hybrid;
pub mod lattice;

pub use classic::ClassicSuiteProvider;
pub use hybrid::HybridSuiteProvider;
pub use lattice::{Kyber1024Dilithium5, Kyber512Dilithium2, Kyber768Dilithium3};
