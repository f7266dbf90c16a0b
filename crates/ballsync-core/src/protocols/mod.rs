//! Wire protocol decoding.
//!
//! Each protocol follows a layered structure:
//! - `layout`: offsets, separators and bounds (source of truth)
//! - `reader`: safe access and protocol conventions
//! - `parser`: domain-level decoding
//! - `writer`: the sender-side inverse
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; `source` and `session` handle the
//! socket and the cycle.

pub mod framing;
pub mod records;
