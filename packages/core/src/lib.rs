// Satox Quantum Core
// Quantum-safe key management and hybrid encryption

#![warn(clippy::all)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod state;
pub mod storage;
pub mod utils;

// Re-exports для удобства
pub use config::Config;
pub use crypto::hybrid_encryption::HybridEncryption;
pub use crypto::post_quantum::PostQuantumAlgorithms;
pub use crypto::quantum_manager::{QuantumManager, SharedSecret};
pub use crypto::{AlgorithmInfo, AlgorithmRegistry, KeyPair};
pub use storage::{KeyMetadata, KeyStorage, KeyUsage, StoredKey};
pub use utils::error::{QuantumError, Result};
