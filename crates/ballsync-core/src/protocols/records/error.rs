use thiserror::Error;

/// Reasons a single record line is skipped.
///
/// # Examples
/// ```
/// use ballsync_core::protocols::records::RecordError;
///
/// let err = RecordError::TooFewFields { needed: 5, actual: 1 };
/// assert!(err.to_string().contains("too few fields"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("too few fields: need {needed}, got {actual}")]
    TooFewFields { needed: usize, actual: usize },
    #[error("field {index} has no ':' separator")]
    MissingSeparator { index: usize },
    #[error("invalid id in field {index}: {value:?}")]
    InvalidId { index: usize, value: String },
    #[error("invalid coordinate in field {index}: {value:?}")]
    InvalidCoordinate { index: usize, value: String },
}

/// Errors that reject a whole payload.
#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
