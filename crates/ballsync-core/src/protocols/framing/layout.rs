pub const LENGTH_PREFIX_LEN: usize = 4;
pub const LENGTH_PREFIX_RANGE: std::ops::Range<usize> = 0..LENGTH_PREFIX_LEN;

pub const MIN_FRAME_LEN: usize = 1;
pub const MAX_FRAME_LEN: usize = 100_000;

/// Initial accumulation buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;
