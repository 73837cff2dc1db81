//! Error types for locomotive construction and snapshot restore.

use thiserror::Error;

/// Errors encountered while building or restoring a locomotive.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Snapshot mismatch: {what}")]
    SnapshotMismatch { what: &'static str },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<sl_core::CoreError> for SimError {
    fn from(e: sl_core::CoreError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sl_steam::SteamError> for SimError {
    fn from(e: sl_steam::SteamError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sl_controls::ControlError> for SimError {
    fn from(e: sl_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sl_components::ComponentError> for SimError {
    fn from(e: sl_components::ComponentError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<sl_engine::EngineError> for SimError {
    fn from(e: sl_engine::EngineError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
