/*
 * Error type shared by every fallible platform operation. Missing handlers or
 * objects are not errors; lookups report them as `None` or fall back to the
 * default window procedure instead.
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[cfg(target_os = "windows")]
    #[error("Windows API error: {0}")]
    Os(#[from] windows::core::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
