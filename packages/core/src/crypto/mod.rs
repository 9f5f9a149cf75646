//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼────────────────────┐
//!          ▼                   ▼                    ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌───────────────────┐
//! │ PostQuantum-     │ │ QuantumManager   │ │ HybridEncryption  │
//! │ Algorithms       │ │  - один suite    │ │  - сеансовый ключ │
//! │  - по имени      │ │  - RNG           │ │  - ротация        │
//! └──────────────────┘ └──────────────────┘ └───────────────────┘
//!          │                   │                    │
//!          ▼                   ▼                    │
//! ┌──────────────────┐ ┌──────────────────┐         │
//! │ AlgorithmRegistry│▶│ PqScheme /       │◀────────┘
//! │  - каталог       │ │ SuiteScheme<P>   │
//! └──────────────────┘ └──────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              CryptoProvider (Crypto-Agility)                │
//! │  - KEM (X25519, Kyber)                                      │
//! │  - Signatures (Ed25519, Dilithium)                          │
//! │  - AEAD (ChaCha20-Poly1305)                                 │
//! │  - KDF (HKDF-SHA256)                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! ### Core Traits
//! - [`provider`]: CryptoProvider trait для crypto-agility
//! - [`scheme`]: PqScheme, объектно-безопасный фасад над набором
//!
//! ### Implementations
//! - [`suites`]: Реализации CryptoProvider (Classic, Lattice, Hybrid)
//! - [`registry`]: Каталог алгоритмов
//!
//! ### Components
//! - [`post_quantum`]: PostQuantumAlgorithms
//! - [`quantum_manager`]: QuantumManager
//! - [`hybrid_encryption`]: HybridEncryption
//!
//! ### Utilities
//! - [`keys`]: KeyPair
//! - [`master_key`]: PBKDF2 + AES-256-GCM

// ============================================================================
// Core Traits
// ============================================================================

/// CryptoProvider trait для crypto-agility
pub mod provider;

/// Объектно-безопасные схемы поверх CryptoProvider
pub mod scheme;

// ============================================================================
// Implementations
// ============================================================================

/// Криптографические наборы (Classic, Lattice, Hybrid)
pub mod suites;

pub mod registry;

// ============================================================================
// Components
// ============================================================================

pub mod hybrid_encryption;
pub mod post_quantum;
pub mod quantum_manager;

// ============================================================================
// Utilities
// ============================================================================

pub mod keys;

pub mod master_key;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use keys::KeyPair;
pub use provider::CryptoProvider;
pub use registry::{AlgorithmInfo, AlgorithmRegistry};
pub use scheme::{PqScheme, SuiteScheme};

pub type SuiteID = u16;

/// Suite ID for the classic suite
pub const CLASSIC_SUITE_ID: SuiteID = 1;
/// Suite ID for the X25519+Kyber768 / Ed25519+Dilithium3 hybrid suite
pub const PQ_HYBRID_SUITE_ID: SuiteID = 2;
/// Kyber512 + Dilithium2
pub const LATTICE_L1_SUITE_ID: SuiteID = 3;
/// Kyber768 + Dilithium3
pub const LATTICE_L3_SUITE_ID: SuiteID = 4;
/// Kyber1024 + Dilithium5
pub const LATTICE_L5_SUITE_ID: SuiteID = 5;
