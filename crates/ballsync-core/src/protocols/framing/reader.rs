use super::error::FramingError;
use super::layout;

pub struct FrameReader<'a> {
    buffer: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), FramingError> {
        if self.buffer.len() < needed {
            return Err(FramingError::TooShort {
                needed,
                actual: self.buffer.len(),
            });
        }
        Ok(())
    }

    pub fn read_u32_be(&self, range: std::ops::Range<usize>) -> Result<u32, FramingError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 4 {
            return Err(FramingError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], FramingError> {
        self.buffer.get(range.clone()).ok_or(FramingError::TooShort {
            needed: range.end,
            actual: self.buffer.len(),
        })
    }

    /// Read the length prefix at the front of the buffer without consuming it.
    pub fn read_length_prefix(&self) -> Result<usize, FramingError> {
        let length = self.read_u32_be(layout::LENGTH_PREFIX_RANGE.clone())?;
        Ok(length as usize)
    }
}

/// Check a declared frame length against the protocol bounds.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use ballsync_core::protocols::framing::reader::validate_length;
///
/// assert!(validate_length(1).is_ok());
/// assert!(validate_length(0).is_err());
/// ```
pub fn validate_length(length: usize) -> Result<usize, FramingError> {
    if !(layout::MIN_FRAME_LEN..=layout::MAX_FRAME_LEN).contains(&length) {
        return Err(FramingError::InvalidLength { length });
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::{FrameReader, validate_length};
    use crate::protocols::framing::error::FramingError;
    use crate::protocols::framing::layout;

    #[test]
    fn read_length_prefix_is_big_endian() {
        let buffer = [0x00, 0x01, 0x02, 0x03, 0xff];
        let reader = FrameReader::new(&buffer);
        assert_eq!(reader.read_length_prefix().unwrap(), 0x0001_0203);
    }

    #[test]
    fn read_length_prefix_too_short() {
        let buffer = [0x00, 0x00, 0x01];
        let reader = FrameReader::new(&buffer);
        let err = reader.read_length_prefix().unwrap_err();
        assert_eq!(err, FramingError::TooShort { needed: 4, actual: 3 });
    }

    #[test]
    fn validate_length_bounds() {
        assert!(validate_length(0).is_err());
        assert_eq!(validate_length(1).unwrap(), 1);
        assert_eq!(validate_length(layout::MAX_FRAME_LEN).unwrap(), layout::MAX_FRAME_LEN);
        let err = validate_length(layout::MAX_FRAME_LEN + 1).unwrap_err();
        assert!(matches!(err, FramingError::InvalidLength { length: 100_001 }));
    }

    #[test]
    fn require_len_reports_missing_bytes() {
        let buffer = [0u8; 6];
        let reader = FrameReader::new(&buffer);
        assert!(reader.require_len(6).is_ok());
        let err = reader.require_len(9).unwrap_err();
        assert!(matches!(err, FramingError::TooShort { needed: 9, actual: 6 }));
    }
}
