//! Line-oriented position records carried inside a frame.
//!
//! A payload is UTF-8 text with one record per line (`\n` or `\r\n`). Each
//! record is a comma-separated list of `key:value` tokens; only the
//! positions matter, keys are ignored:
//!
//! ```text
//! Ball0, id:0, X:640.00, Y:360.00, color:red
//! ```
//!
//! Field 0 names the slot, fields 1..=4 carry id, x, y and color. Errors are
//! isolated per line so one malformed record never costs the rest of the
//! frame; only invalid UTF-8 rejects a whole payload.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use error::{RecordError, RecordsError};
pub use parser::{BallUpdate, Record, Records, parse_payload, parse_record};
pub use writer::format_record;
