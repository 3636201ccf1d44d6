use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the fallible edges of the library. Tracking itself never fails.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tracker configuration: {0}")]
    InvalidConfig(String),

    #[error("Detector output shape mismatch: {what} has {actual} rows, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid label map: {0}")]
    LabelMap(String),
}
