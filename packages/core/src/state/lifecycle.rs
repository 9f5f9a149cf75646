//! Жизненный цикл компонентов
//!
//! Все четыре компонента подсистемы разделяют одну дисциплину:
//!
//! ```text
//! Uninitialized ──initialize()──▶ Initialized ──shutdown()──▶ Shutdown
//! ```
//!
//! `Shutdown` терминален: повторная инициализация возвращает
//! `AlreadyShutdown`, любые операции после него возвращают `NotInitialized`.

use crate::utils::error::{QuantumError, Result};

/// Состояние жизненного цикла компонента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Shutdown,
}

impl LifecycleState {
    /// Переход `Uninitialized → Initialized`
    pub fn begin(&mut self) -> Result<()> {
        match self {
            LifecycleState::Uninitialized => {
                *self = LifecycleState::Initialized;
                Ok(())
            }
            LifecycleState::Initialized => Err(QuantumError::AlreadyInitialized),
            LifecycleState::Shutdown => Err(QuantumError::AlreadyShutdown),
        }
    }

    /// Переход в `Shutdown`. Идемпотентен.
    ///
    /// Возвращает `true`, если компонент был инициализирован и ему нужно
    /// освободить ресурсы.
    pub fn end(&mut self) -> bool {
        let was_initialized = *self == LifecycleState::Initialized;
        *self = LifecycleState::Shutdown;
        was_initialized
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(QuantumError::NotInitialized)
        }
    }

    pub fn is_initialized(&self) -> bool {
        *self == LifecycleState::Initialized
    }
}
