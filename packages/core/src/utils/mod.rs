// Вспомогательные модули

pub mod error;
pub mod serialization;
pub mod time;
pub mod uuid;
