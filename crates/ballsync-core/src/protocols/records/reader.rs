use super::error::RecordError;
use super::layout;

/// Positional access to the `key:value` fields of one record line.
pub struct RecordReader<'a> {
    fields: Vec<&'a str>,
}

impl<'a> RecordReader<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            fields: line.split(layout::FIELD_SEPARATOR).collect(),
        }
    }

    pub fn require_fields(&self, needed: usize) -> Result<(), RecordError> {
        if self.fields.len() < needed {
            return Err(RecordError::TooFewFields {
                needed,
                actual: self.fields.len(),
            });
        }
        Ok(())
    }

    /// Value of field `index`: the segment after the first `:`, trimmed.
    ///
    /// Anything after a second `:` is ignored.
    pub fn read_value(&self, index: usize) -> Result<&'a str, RecordError> {
        let field: &'a str = self.fields.get(index).copied().ok_or(RecordError::TooFewFields {
            needed: index + 1,
            actual: self.fields.len(),
        })?;
        field
            .split(layout::VALUE_SEPARATOR)
            .nth(1)
            .map(str::trim)
            .ok_or(RecordError::MissingSeparator { index })
    }

    pub fn read_id(&self, index: usize) -> Result<i64, RecordError> {
        let value = self.read_value(index)?;
        value.parse::<i64>().map_err(|_| RecordError::InvalidId {
            index,
            value: value.to_string(),
        })
    }

    /// Parse a decimal pixel coordinate and truncate it toward zero.
    pub fn read_pixel(&self, index: usize) -> Result<i32, RecordError> {
        let value = self.read_value(index)?;
        let invalid = || RecordError::InvalidCoordinate {
            index,
            value: value.to_string(),
        };
        let parsed = value.parse::<f64>().map_err(|_| invalid())?;
        let truncated = parsed.trunc();
        if !truncated.is_finite()
            || truncated < f64::from(i32::MIN)
            || truncated > f64::from(i32::MAX)
        {
            return Err(invalid());
        }
        Ok(truncated as i32)
    }

    pub fn read_label(&self, index: usize) -> Result<String, RecordError> {
        Ok(self.read_value(index)?.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordReader;
    use crate::protocols::records::error::RecordError;

    #[test]
    fn read_value_takes_second_segment() {
        let reader = RecordReader::new("Ball0, id: 3 ,X:1:2");
        assert_eq!(reader.read_value(1).unwrap(), "3");
        assert_eq!(reader.read_value(2).unwrap(), "1");
    }

    #[test]
    fn read_value_without_separator() {
        let reader = RecordReader::new("Ball0,id3");
        let err = reader.read_value(1).unwrap_err();
        assert_eq!(err, RecordError::MissingSeparator { index: 1 });
    }

    #[test]
    fn read_pixel_truncates_toward_zero() {
        let reader = RecordReader::new("a,x:12.99,y:-3.7");
        assert_eq!(reader.read_pixel(1).unwrap(), 12);
        assert_eq!(reader.read_pixel(2).unwrap(), -3);
    }

    #[test]
    fn read_pixel_rejects_non_finite() {
        let reader = RecordReader::new("a,x:NaN,y:inf,z:1e300");
        assert!(matches!(reader.read_pixel(1), Err(RecordError::InvalidCoordinate { .. })));
        assert!(matches!(reader.read_pixel(2), Err(RecordError::InvalidCoordinate { .. })));
        assert!(matches!(reader.read_pixel(3), Err(RecordError::InvalidCoordinate { .. })));
    }

    #[test]
    fn read_id_rejects_decimal() {
        let reader = RecordReader::new("a,id:1.5");
        let err = reader.read_id(1).unwrap_err();
        assert!(matches!(err, RecordError::InvalidId { index: 1, .. }));
    }

    #[test]
    fn read_label_lowercases() {
        let reader = RecordReader::new("a,color: Red ");
        assert_eq!(reader.read_label(1).unwrap(), "red");
    }
}
