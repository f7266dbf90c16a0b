//! Length-prefixed framing over a raw byte stream.
//!
//! Every frame on the wire is a 4-byte big-endian length followed by that
//! many payload bytes. The decoder accumulates arbitrary-sized reads and
//! yields complete payloads in arrival order. A length outside
//! `MIN_FRAME_LEN..=MAX_FRAME_LEN` is treated as corrupt framing: only the
//! four prefix bytes are dropped and decoding resumes right after them.
//!
//! The sender writes `len.to_bytes(4, "big")`, so big-endian is the fixed
//! byte order of the protocol; it is not negotiated per connection.
//!
//! Version française (résumé):
//! Le décodeur accumule les octets reçus et produit les trames complètes
//! (préfixe de longueur 4 octets big-endian). Une longueur hors bornes ne
//! fait perdre que les 4 octets du préfixe (resynchronisation).

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use error::FramingError;
pub use parser::{FrameDecoder, Frames, FramingStats};
pub use writer::encode_frame;
