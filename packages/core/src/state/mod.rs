// Состояние компонентов

pub mod lifecycle;

pub use lifecycle::LifecycleState;
