//! Error types for consumer construction.

use sl_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building a steam consumer.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<CoreError> for ComponentError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            CoreError::InvalidArg { what }
            | CoreError::NotMonotone { what, .. }
            | CoreError::Invariant { what } => ComponentError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "orifice area" };
        assert!(err.to_string().contains("orifice area"));
    }

    #[test]
    fn error_conversion() {
        let err: ComponentError = CoreError::NonFinite {
            what: "rate",
            value: f64::NAN,
        }
        .into();
        assert!(matches!(err, ComponentError::NonPhysical { what: "rate" }));
    }
}
