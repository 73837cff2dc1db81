use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Curve {what} is not monotone at index {index}")]
    NotMonotone { what: &'static str, index: usize },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
