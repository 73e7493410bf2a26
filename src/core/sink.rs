use crate::error::{EncodeError, Result};

/// Destination of encoded rows.
///
/// A sink handles the textual side of CSV (quoting, delimiters, line
/// terminators); encoders only hand it rows of already-converted fields. A sink
/// belongs to one encode call at a time.
pub trait RowSink {
    fn write_row(&mut self, fields: &[String]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// The last error the sink ran into, if any. Checked after the final flush.
    fn last_error(&self) -> Option<EncodeError> {
        None
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write_row(&mut self, fields: &[String]) -> Result<()> {
        (**self).write_row(fields)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn last_error(&self) -> Option<EncodeError> {
        (**self).last_error()
    }
}

/// Keeps rows in memory.
impl RowSink for Vec<Vec<String>> {
    fn write_row(&mut self, fields: &[String]) -> Result<()> {
        self.push(fields.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Flushes `sink` and surfaces the error state it ends up in.
pub(crate) fn finish<S: RowSink + ?Sized>(sink: &mut S) -> Result<()> {
    sink.flush()?;
    match sink.last_error() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{RowSink, finish};
    use crate::error::{EncodeError, Result};

    struct Poisoned;

    impl RowSink for Poisoned {
        fn write_row(&mut self, _: &[String]) -> Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn last_error(&self) -> Option<EncodeError> {
            Some(EncodeError::Sink("disk full".to_string()))
        }
    }

    #[test]
    fn rows_are_kept_in_memory() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        rows.write_row(&["a".to_string(), "b".to_string()]).unwrap();
        assert!(finish(&mut rows).is_ok());
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn a_recorded_error_surfaces_after_flush() {
        let err = finish(&mut Poisoned).unwrap_err();
        assert_eq!(err, EncodeError::Sink("disk full".to_string()));
    }

    #[test]
    fn mutable_references_forward_to_the_sink() {
        fn write_one<S: RowSink>(mut sink: S) -> Result<()> {
            sink.write_row(&["x".to_string()])?;
            sink.flush()
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        write_one(&mut rows).unwrap();
        write_one(&mut rows).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
