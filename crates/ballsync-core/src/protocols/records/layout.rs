pub const FIELD_SEPARATOR: char = ',';
pub const VALUE_SEPARATOR: char = ':';

pub const MIN_FIELDS: usize = 5;

pub const NAME_FIELD: usize = 0;
pub const ID_FIELD: usize = 1;
pub const X_FIELD: usize = 2;
pub const Y_FIELD: usize = 3;
pub const COLOR_FIELD: usize = 4;

/// Color label the producer uses for a slot with no detection this frame.
pub const NO_DETECTION_LABEL: &str = "none";
