use super::error::FramingError;
use super::layout;
use super::reader::validate_length;

/// Prefix `payload` with its big-endian length, ready to be written to the wire.
///
/// # Examples
/// ```
/// use ballsync_core::protocols::framing::encode_frame;
///
/// let frame = encode_frame(b"AAAAA").unwrap();
/// assert_eq!(&frame[..4], &[0, 0, 0, 5]);
/// assert_eq!(&frame[4..], b"AAAAA");
/// ```
///
/// # Errors
/// Returns `FramingError::InvalidLength` for an empty payload or one larger
/// than the receiver accepts.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FramingError> {
    let length = validate_length(payload.len())?;
    let mut frame = Vec::with_capacity(layout::LENGTH_PREFIX_LEN + length);
    frame.extend_from_slice(&(length as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}
