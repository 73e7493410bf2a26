use log::trace;
use serde::Serialize;

use crate::{
    core::{
        field::FieldInfo,
        projection::{Target, project_into},
        sink::RowSink,
    },
    error::Result,
};

#[cfg(feature = "csv")]
use serde::de::DeserializeOwned;
#[cfg(feature = "csv")]
use std::io;

#[cfg(feature = "csv")]
use crate::{error::EncodeError, sink::csv::csv_writer::CsvRowWriterBuilder};

/// Encodes a whole container at once, with empty column omission.
pub mod bounded;

/// Encodes records one by one as they arrive.
pub mod streaming;

/// Turns serde records into rows and hands them to a [`RowSink`].
///
/// # Examples
///
/// ```
/// use csv_marshal::encoder::Encoder;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Car {
///     make: &'static str,
///     #[serde(rename = "model,omitempty")]
///     model: &'static str,
/// }
///
/// let cars = vec![Car { make: "Porsche", model: "" }, Car { make: "Mazda", model: "" }];
///
/// let mut rows: Vec<Vec<String>> = Vec::new();
/// Encoder::new(&mut rows).encode_all(&cars, false).unwrap();
///
/// assert_eq!(rows, vec![vec!["make"], vec!["Porsche"], vec!["Mazda"]]);
/// ```
pub struct Encoder<S> {
    sink: S,
}

impl<S: RowSink> Encoder<S> {
    pub fn new(sink: S) -> Encoder<S> {
        Encoder { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Row buffer bound to an ordered column list, overwritten for every row.
pub(crate) struct RowWriter<'f> {
    targets: Vec<Target<'f>>,
    buffer: Vec<String>,
}

impl<'f> RowWriter<'f> {
    pub(crate) fn new(columns: &'f [FieldInfo]) -> RowWriter<'f> {
        RowWriter {
            targets: columns
                .iter()
                .enumerate()
                .map(|(slot, field)| Target { slot, field })
                .collect(),
            buffer: vec![String::new(); columns.len()],
        }
    }

    pub(crate) fn write_header<S: RowSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        for target in &self.targets {
            self.buffer[target.slot].clear();
            self.buffer[target.slot].push_str(target.field.first_key());
        }
        sink.write_row(&self.buffer)
    }

    pub(crate) fn write_record<S, T>(&mut self, sink: &mut S, row: usize, record: &T) -> Result<()>
    where
        S: RowSink + ?Sized,
        T: Serialize + ?Sized,
    {
        project_into(record, row, &self.targets, &mut self.buffer)?;
        trace!("Writing row {row}");
        sink.write_row(&self.buffer)
    }
}

/// Writes `records` as CSV, header first.
///
/// Columns come from the type `T`, so an empty slice still gets a header.
#[cfg(feature = "csv")]
pub fn to_writer<T, W>(records: &[T], writer: W) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    W: io::Write,
{
    let mut sink = CsvRowWriterBuilder::new().from_writer(writer);
    Encoder::new(&mut sink).encode_slice(records, false)
}

/// Writes `records` as CSV without the header row.
#[cfg(feature = "csv")]
pub fn to_writer_without_headers<T, W>(records: &[T], writer: W) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    W: io::Write,
{
    let mut sink = CsvRowWriterBuilder::new().from_writer(writer);
    Encoder::new(&mut sink).encode_slice(records, true)
}

#[cfg(feature = "csv")]
pub fn to_bytes<T: Serialize + DeserializeOwned>(records: &[T]) -> Result<Vec<u8>> {
    let mut sink = CsvRowWriterBuilder::new().from_writer(Vec::new());
    Encoder::new(&mut sink).encode_slice(records, false)?;
    sink.into_inner()
}

/// Encodes `records` into a CSV string.
///
/// ```
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct City {
///     city: String,
///     #[serde(rename = "popcount")]
///     population: u64,
/// }
///
/// let cities = [
///     City { city: "Boston".into(), population: 4628910 },
///     City { city: "Concord".into(), population: 42695 },
/// ];
///
/// let csv = csv_marshal::to_string(&cities).unwrap();
/// assert_eq!(csv, "city,popcount\nBoston,4628910\nConcord,42695\n");
///
/// let none: Vec<City> = Vec::new();
/// assert_eq!(csv_marshal::to_string(&none).unwrap(), "city,popcount\n");
/// ```
#[cfg(feature = "csv")]
pub fn to_string<T: Serialize + DeserializeOwned>(records: &[T]) -> Result<String> {
    String::from_utf8(to_bytes(records)?).map_err(|error| EncodeError::Sink(error.to_string()))
}

/// Writes every record of `source` as CSV, header first.
#[cfg(feature = "csv")]
pub fn iter_to_writer<I, W>(source: I, writer: W) -> Result<()>
where
    I: IntoIterator,
    I::Item: Serialize,
    W: io::Write,
{
    let mut sink = CsvRowWriterBuilder::new().from_writer(writer);
    Encoder::new(&mut sink).encode_iter(source)
}

/// Writes every record received on `source` as CSV until the channel closes.
#[cfg(all(feature = "csv", feature = "channel"))]
pub async fn channel_to_writer<T, W>(source: tokio::sync::mpsc::Receiver<T>, writer: W) -> Result<()>
where
    T: Serialize,
    W: io::Write,
{
    let mut sink = CsvRowWriterBuilder::new().from_writer(writer);
    Encoder::new(&mut sink).encode_channel(source).await
}
