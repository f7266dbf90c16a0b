use thiserror::Error;

/// Errors returned by frame decoding and encoding.
///
/// # Examples
/// ```
/// use ballsync_core::protocols::framing::FramingError;
///
/// let err = FramingError::InvalidLength { length: 0 };
/// assert!(err.to_string().contains("invalid frame length"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid frame length: {length} (allowed 1..=100000)")]
    InvalidLength { length: usize },
}
