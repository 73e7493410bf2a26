use std::io::Write;

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::{
    core::sink::RowSink,
    error::{EncodeError, Result},
};

/// A [`RowSink`] writing rows as CSV records.
///
/// Every record must have as many fields as the first one. The writer keeps
/// the last error it reported so [`RowSink::last_error`] can surface it after
/// the final flush.
pub struct CsvRowWriter<W: Write> {
    writer: Writer<W>,
    last_error: Option<EncodeError>,
}

impl<W: Write> CsvRowWriter<W> {
    fn remember(&mut self, result: Result<()>) -> Result<()> {
        if let Err(error) = &result {
            self.last_error = Some(error.clone());
        }
        result
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|error| EncodeError::Sink(error.error().to_string()))
    }
}

impl<W: Write> RowSink for CsvRowWriter<W> {
    fn write_row(&mut self, fields: &[String]) -> Result<()> {
        let result = self
            .writer
            .write_record(fields)
            .map_err(|error| EncodeError::Sink(error.to_string()));
        self.remember(result)
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&mut self) -> Result<()> {
        let result = self
            .writer
            .flush()
            .map_err(|error| EncodeError::Sink(error.to_string()));
        self.remember(result)
    }

    fn last_error(&self) -> Option<EncodeError> {
        self.last_error.clone()
    }
}

pub struct CsvRowWriterBuilder {
    delimiter: u8,
    terminator: Terminator,
    quote_style: QuoteStyle,
}

impl Default for CsvRowWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvRowWriterBuilder {
    pub fn new() -> CsvRowWriterBuilder {
        CsvRowWriterBuilder {
            delimiter: b',',
            terminator: Terminator::Any(b'\n'),
            quote_style: QuoteStyle::Necessary,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvRowWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvRowWriterBuilder {
        self.terminator = terminator;
        self
    }

    pub fn quote_style(mut self, quote_style: QuoteStyle) -> CsvRowWriterBuilder {
        self.quote_style = quote_style;
        self
    }

    /// Builds a writer over any `io::Write`.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # use csv_marshal::{core::sink::RowSink, sink::csv::csv_writer::CsvRowWriterBuilder};
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let mut wtr = CsvRowWriterBuilder::new().from_writer(vec![]);
    ///
    ///     wtr.write_row(&["city".to_string(), "popcount".to_string()])?;
    ///     wtr.write_row(&["Boston".to_string(), "4628910".to_string()])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "city,popcount\nBoston,4628910\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn from_writer<W: Write>(self, wtr: W) -> CsvRowWriter<W> {
        let wtr = WriterBuilder::new()
            .flexible(false)
            .has_headers(false)
            .delimiter(self.delimiter)
            .terminator(self.terminator)
            .quote_style(self.quote_style)
            .from_writer(wtr);

        CsvRowWriter {
            writer: wtr,
            last_error: None,
        }
    }
}
