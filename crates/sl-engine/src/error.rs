//! Error types for engine construction.

use thiserror::Error;

/// Errors encountered while building an engine model.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<sl_core::CoreError> for EngineError {
    fn from(e: sl_core::CoreError) -> Self {
        EngineError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sl_controls::ControlError> for EngineError {
    fn from(e: sl_controls::ControlError) -> Self {
        EngineError::Backend {
            message: e.to_string(),
        }
    }
}
