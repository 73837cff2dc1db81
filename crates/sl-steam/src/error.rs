//! Steam property errors.

use sl_core::CoreError;
use thiserror::Error;

/// Result type for steam property operations.
pub type SteamResult<T> = Result<T, SteamError>;

/// Errors raised while building the property tables.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SteamError {
    /// A calibration table failed validation.
    #[error("Invalid steam table {table}: {source}")]
    InvalidTable {
        table: &'static str,
        source: CoreError,
    },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

/// Attach the table name to a curve construction failure.
pub(crate) fn table(table: &'static str) -> impl FnOnce(CoreError) -> SteamError {
    move |source| SteamError::InvalidTable { table, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_table() {
        let err = SteamError::InvalidTable {
            table: "steam density",
            source: CoreError::InvalidArg { what: "x" },
        };
        assert!(err.to_string().contains("steam density"));
    }
}
