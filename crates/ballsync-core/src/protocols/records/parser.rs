use serde::{Deserialize, Serialize};

use super::error::{RecordError, RecordsError};
use super::layout;
use super::reader::RecordReader;

/// One decoded position record, still in image pixel space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallUpdate {
    /// Slot id as sent; range checks happen against the sink.
    pub id: i64,
    pub pixel_x: i32,
    pub pixel_y: i32,
    /// Trimmed, lower-cased color label.
    pub color: String,
}

/// Parse a single record line.
///
/// # Examples
/// ```
/// use ballsync_core::protocols::records::parse_record;
///
/// let update = parse_record("Ball1, id:1, X:30.75, Y:40.00, color:Blue").unwrap();
/// assert_eq!((update.id, update.pixel_x, update.pixel_y), (1, 30, 40));
/// assert_eq!(update.color, "blue");
/// ```
pub fn parse_record(line: &str) -> Result<BallUpdate, RecordError> {
    let reader = RecordReader::new(line);
    reader.require_fields(layout::MIN_FIELDS)?;

    Ok(BallUpdate {
        id: reader.read_id(layout::ID_FIELD)?,
        pixel_x: reader.read_pixel(layout::X_FIELD)?,
        pixel_y: reader.read_pixel(layout::Y_FIELD)?,
        color: reader.read_label(layout::COLOR_FIELD)?,
    })
}

/// A record line together with its parse outcome.
#[derive(Debug)]
pub struct Record<'a> {
    pub line: &'a str,
    pub outcome: Result<BallUpdate, RecordError>,
}

/// Decode a frame payload and return its records lazily.
///
/// Empty lines are skipped; every other line yields exactly one [`Record`].
///
/// # Errors
/// Returns `RecordsError::InvalidUtf8` when the payload is not UTF-8; in
/// that case none of its records are usable.
pub fn parse_payload(payload: &[u8]) -> Result<Records<'_>, RecordsError> {
    let text = std::str::from_utf8(payload)?;
    Ok(Records {
        lines: text.lines(),
    })
}

/// Lazy sequence of records returned by [`parse_payload`].
pub struct Records<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.by_ref().find(|line| !line.is_empty())?;
        Some(Record {
            line,
            outcome: parse_record(line),
        })
    }
}
