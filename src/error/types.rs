use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the screen stack crate.
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Errors surfaced by screens and the screen stack.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("`{operation}` must be called on the main thread")]
    WrongThread { operation: &'static str },
    #[error("screen stack is empty")]
    EmptyStack,
    #[error("screen {0} is destroyed and cannot be pushed again")]
    ScreenDestroyed(u64),
    #[error("screen callback failed: {0}")]
    Callback(String),
    #[error("shared state poisoned")]
    Poisoned,
    #[error(transparent)]
    Logging(#[from] LoggingError),
}
