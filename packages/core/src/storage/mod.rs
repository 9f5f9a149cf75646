// Модуль хранилища ключей

pub mod backup;
pub mod memory;
pub mod models;

pub use memory::{KeyStorage, KeyUsage};
pub use models::{KeyMetadata, StoredKey};
