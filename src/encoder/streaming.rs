use log::debug;
use serde::Serialize;

use super::{Encoder, RowWriter};
use crate::{
    core::{
        field::{StructInfo, describe_record},
        shape::{Shape, ensure_record_shape},
        sink::{RowSink, finish},
    },
    error::{EncodeError, Result},
};

impl<S: RowSink> Encoder<S> {
    /// Encodes records pulled one at a time from `source`.
    ///
    /// The first record fixes the columns and the header is written right
    /// away, so no column is ever omitted in this mode. A nested `Option` that
    /// is `None` in the first record stays a single column; a later record
    /// holding a struct there fails with [`EncodeError::NestedAfterEmpty`]. Rows follow in the
    /// order the source yields them. A source that yields nothing is an
    /// [`EncodeError::EmptySource`] and leaves the sink untouched.
    ///
    /// A `std::sync::mpsc::Receiver` works as a source: the call blocks on
    /// each receive and returns once every sender is gone.
    pub fn encode_iter<I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let mut source = source.into_iter();
        let first = source.next().ok_or(EncodeError::EmptySource)?;
        let info = describe_first(&first)?;

        let mut writer = RowWriter::new(&info.fields);
        writer.write_header(&mut self.sink)?;
        writer.write_record(&mut self.sink, 0, &first)?;

        let mut rows = 1;
        for record in source {
            writer
                .write_record(&mut self.sink, rows, &record)
                .map_err(|error| explain(error, &info, rows))?;
            rows += 1;
        }

        debug!("Streamed {rows} rows");
        finish(&mut self.sink)
    }

    /// Same as [`Encoder::encode_iter`], awaiting each record from a tokio
    /// channel until every sender has been dropped.
    #[cfg(feature = "channel")]
    pub async fn encode_channel<T: Serialize>(
        &mut self,
        mut source: tokio::sync::mpsc::Receiver<T>,
    ) -> Result<()> {
        let first = source.recv().await.ok_or(EncodeError::EmptySource)?;
        let info = describe_first(&first)?;

        let mut writer = RowWriter::new(&info.fields);
        writer.write_header(&mut self.sink)?;
        writer.write_record(&mut self.sink, 0, &first)?;

        let mut rows = 1;
        while let Some(record) = source.recv().await {
            writer
                .write_record(&mut self.sink, rows, &record)
                .map_err(|error| explain(error, &info, rows))?;
            rows += 1;
        }

        debug!("Streamed {rows} rows from channel");
        finish(&mut self.sink)
    }
}

fn describe_first<T: Serialize + ?Sized>(record: &T) -> Result<StructInfo> {
    let shape = Shape::of(record)?;
    if shape.is_nil() {
        return Err(EncodeError::NilRecord { row: 0 });
    }
    let record_shape = ensure_record_shape(&shape)?;
    let info = describe_record(record)?;
    debug!(
        "Streaming columns {} of {}",
        info.headers().join(","),
        record_shape.name
    );
    Ok(info)
}

/// Names the layout conflict when a struct shows up in a column the first
/// record described from a `None`.
fn explain(error: EncodeError, info: &StructInfo, row: usize) -> EncodeError {
    match error {
        EncodeError::UnsupportedFieldType { key, kind }
            if kind.starts_with("struct ") && info.is_open_column(&key) =>
        {
            EncodeError::NestedAfterEmpty { row, key }
        }
        error => error,
    }
}
