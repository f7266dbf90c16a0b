use super::parser::BallUpdate;

/// Format a record the way the bridge emits it.
///
/// Coordinates are written with two decimals; the receiver truncates them.
///
/// # Examples
/// ```
/// use ballsync_core::protocols::records::{BallUpdate, format_record};
///
/// let update = BallUpdate { id: 0, pixel_x: 12, pixel_y: 34, color: "red".into() };
/// assert_eq!(format_record("Ball0", &update), "Ball0, id:0, X:12.00, Y:34.00, color:red");
/// ```
pub fn format_record(name: &str, update: &BallUpdate) -> String {
    format!(
        "{name}, id:{}, X:{:.2}, Y:{:.2}, color:{}",
        update.id,
        f64::from(update.pixel_x),
        f64::from(update.pixel_y),
        update.color
    )
}

#[cfg(test)]
mod tests {
    use super::format_record;
    use crate::protocols::records::parser::{BallUpdate, parse_record};

    #[test]
    fn formatted_record_parses_back() {
        let update = BallUpdate {
            id: 5,
            pixel_x: 1280,
            pixel_y: 0,
            color: "none".to_string(),
        };
        let line = format_record("Ball5", &update);
        assert_eq!(parse_record(&line).unwrap(), update);
    }
}
