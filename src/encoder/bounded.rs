use log::debug;
use serde::{Serialize, de::DeserializeOwned};

use super::{Encoder, RowWriter};
use crate::{
    core::{
        container::{VisitRecord, for_each_record},
        field::{FieldInfo, StructInfo, describe_record, describe_type},
        projection::{Target, project_into},
        shape::{Shape, ensure_container_shape, ensure_element_shape},
        sink::{RowSink, finish},
    },
    error::{EncodeError, Result, ShapeMismatch},
};

impl<S: RowSink> Encoder<S> {
    /// Encodes every record of a slice, `Vec`, array or tuple.
    ///
    /// Columns are derived from the records themselves: every element is
    /// inspected before anything is written, so a nested `Option` that is
    /// `None` in the first rows still gets its columns from a later row. All
    /// elements must be the same struct. Columns tagged `omitempty` that are
    /// empty in every row are dropped from the header and all rows. Unless
    /// `omit_headers` is set, a header row precedes the data.
    ///
    /// Shape errors are returned before anything reaches the sink. Any later
    /// error stops the call, leaving the rows already written in the sink.
    /// An empty container writes nothing, as there is no record to take the
    /// column layout from; [`Encoder::encode_slice`] derives it from the type.
    pub fn encode_all<C: Serialize + ?Sized>(&mut self, records: &C, omit_headers: bool) -> Result<()> {
        ensure_container_shape(&Shape::of(records)?)?;

        let mut inspect = Inspect::default();
        let rows = for_each_record(records, &mut inspect)?;
        let Some(info) = inspect.info else {
            debug!("No record to encode");
            return finish(&mut self.sink);
        };

        self.encode_columns(records, rows, info.fields, omit_headers)
    }

    /// Encodes a slice of records whose columns are derived from the type `T`.
    ///
    /// Nested structs always get their columns, even when no row holds one,
    /// and an empty slice still gets a header: the columns that are not tagged
    /// `omitempty`. If `T` cannot be traced, the columns are derived from the
    /// records as in [`Encoder::encode_all`].
    pub fn encode_slice<T>(&mut self, records: &[T], omit_headers: bool) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let info = match describe_type::<T>() {
            Ok(info) => info,
            Err(EncodeError::Layout(reason)) if !records.is_empty() => {
                debug!("Deriving columns from the records: {reason}");
                return self.encode_all(records, omit_headers);
            }
            Err(error) => return Err(error),
        };

        for (row, record) in records.iter().enumerate() {
            if Shape::of(record)?.is_nil() {
                return Err(EncodeError::NilRecord { row });
            }
        }

        self.encode_columns(records, records.len(), info.fields, omit_headers)
    }

    /// Omission pre-pass, header and rows over an already derived layout.
    fn encode_columns<C: Serialize + ?Sized>(
        &mut self,
        records: &C,
        rows: usize,
        fields: Vec<FieldInfo>,
        omit_headers: bool,
    ) -> Result<()> {
        let mut counters = OmissionCounters::new(&fields);
        let columns = if counters.any_to_omit() {
            for_each_record(records, &mut CountEmpty::new(&fields, &mut counters))?;
            elide(fields, &counters.omitted(rows))
        } else {
            fields
        };

        let mut writer = RowWriter::new(&columns);
        if !omit_headers {
            writer.write_header(&mut self.sink)?;
        }
        for_each_record(
            records,
            &mut EmitRows {
                writer: &mut writer,
                sink: &mut self.sink,
            },
        )?;

        debug!("Encoded {rows} rows of {} columns", columns.len());
        finish(&mut self.sink)
    }
}

/// Checks every element and derives the columns from all of them.
#[derive(Default)]
struct Inspect {
    record: &'static str,
    info: Option<StructInfo>,
}

impl VisitRecord for Inspect {
    fn visit<T: Serialize + ?Sized>(&mut self, row: usize, record: &T) -> Result<()> {
        let shape = Shape::of(record)?;
        if shape.is_nil() {
            return Err(EncodeError::NilRecord { row });
        }
        let element = ensure_element_shape(&shape)?;

        match &mut self.info {
            Some(info) => {
                if element.name != self.record {
                    return Err(EncodeError::shape(
                        shape.to_string(),
                        ShapeMismatch::ElementNotRecord,
                    ));
                }
                if info.has_open_fields() {
                    info.merge(&describe_record(record)?);
                }
            }
            None => {
                let info = describe_record(record)?;
                debug!(
                    "Derived columns {} from {} (through option: {})",
                    info.headers().join(","),
                    element.name,
                    element.indirect
                );
                self.record = element.name;
                self.info = Some(info);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Counter {
    /// The column is not tagged `omitempty`.
    Never,
    /// How many rows had the column empty so far.
    Empty(usize),
}

/// Per-column empty counts, aligned with the described fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OmissionCounters {
    counters: Vec<Counter>,
}

impl OmissionCounters {
    pub(crate) fn new(fields: &[FieldInfo]) -> OmissionCounters {
        OmissionCounters {
            counters: fields
                .iter()
                .map(|field| {
                    if field.omit_empty() {
                        Counter::Empty(0)
                    } else {
                        Counter::Never
                    }
                })
                .collect(),
        }
    }

    pub(crate) fn any_to_omit(&self) -> bool {
        self.counters
            .iter()
            .any(|counter| *counter != Counter::Never)
    }

    fn record_empty(&mut self, column: usize) {
        if let Some(Counter::Empty(count)) = self.counters.get_mut(column) {
            *count += 1;
        }
    }

    /// Columns that were empty in each of the `rows` rows.
    pub(crate) fn omitted(&self, rows: usize) -> Vec<usize> {
        self.counters
            .iter()
            .enumerate()
            .filter(|(_, counter)| **counter == Counter::Empty(rows))
            .map(|(column, _)| column)
            .collect()
    }
}

/// Pre-pass: counts empty values of `omitempty` columns.
struct CountEmpty<'a> {
    targets: Vec<Target<'a>>,
    buffer: Vec<String>,
    counters: &'a mut OmissionCounters,
}

impl<'a> CountEmpty<'a> {
    fn new(fields: &'a [FieldInfo], counters: &'a mut OmissionCounters) -> CountEmpty<'a> {
        CountEmpty {
            targets: fields
                .iter()
                .enumerate()
                .filter(|(_, field)| field.omit_empty())
                .map(|(slot, field)| Target { slot, field })
                .collect(),
            buffer: vec![String::new(); fields.len()],
            counters,
        }
    }
}

impl VisitRecord for CountEmpty<'_> {
    fn visit<T: Serialize + ?Sized>(&mut self, row: usize, record: &T) -> Result<()> {
        project_into(record, row, &self.targets, &mut self.buffer)?;
        for target in &self.targets {
            if self.buffer[target.slot].is_empty() {
                self.counters.record_empty(target.slot);
            }
        }
        Ok(())
    }
}

/// Builds the column list without the `omitted` positions, keeping order.
fn elide(fields: Vec<FieldInfo>, omitted: &[usize]) -> Vec<FieldInfo> {
    fields
        .into_iter()
        .enumerate()
        .filter_map(|(column, field)| {
            if omitted.contains(&column) {
                debug!("Omitting empty column {}", field.first_key());
                None
            } else {
                Some(field)
            }
        })
        .collect()
}

struct EmitRows<'w, 'f, S> {
    writer: &'w mut RowWriter<'f>,
    sink: &'w mut S,
}

impl<S: RowSink> VisitRecord for EmitRows<'_, '_, S> {
    fn visit<T: Serialize + ?Sized>(&mut self, row: usize, record: &T) -> Result<()> {
        self.writer.write_record(&mut *self.sink, row, record)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{CountEmpty, OmissionCounters, elide};
    use crate::{
        core::{container::for_each_record, field::describe_record},
        encoder::Encoder,
        error::{EncodeError, ShapeMismatch},
    };

    #[derive(Serialize, Clone)]
    struct Item {
        #[serde(rename = "Name")]
        name: &'static str,
        #[serde(rename = "Tag,omitempty")]
        tag: &'static str,
    }

    fn items(tags: &[&'static str]) -> Vec<Item> {
        tags.iter()
            .copied()
            .enumerate()
            .map(|(i, tag)| Item {
                name: ["A", "B", "C"][i],
                tag,
            })
            .collect()
    }

    fn encode<C: Serialize + ?Sized>(records: &C, omit_headers: bool) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = Vec::new();
        Encoder::new(&mut rows)
            .encode_all(records, omit_headers)
            .unwrap();
        rows
    }

    #[test]
    fn a_column_empty_in_every_row_is_elided() {
        let rows = encode(&items(&["", ""]), false);
        assert_eq!(rows, vec![vec!["Name"], vec!["A"], vec!["B"]]);
    }

    #[test]
    fn a_single_value_keeps_the_column() {
        let rows = encode(&items(&["", "x"]), false);
        assert_eq!(
            rows,
            vec![vec!["Name", "Tag"], vec!["A", ""], vec!["B", "x"]]
        );
    }

    #[test]
    fn headers_can_be_left_out() {
        let rows = encode(&items(&["t", "u"]), true);
        assert_eq!(rows, vec![vec!["A", "t"], vec!["B", "u"]]);
    }

    #[test]
    fn arrays_of_options_are_encoded() {
        let records = [Some(Item { name: "A", tag: "" })];
        let rows = encode(&records, false);
        assert_eq!(rows, vec![vec!["Name"], vec!["A"]]);
    }

    #[test]
    fn a_none_element_is_a_nil_record_error() {
        let records = vec![Some(Item { name: "A", tag: "" }), None];
        let mut rows: Vec<Vec<String>> = Vec::new();
        let err = Encoder::new(&mut rows)
            .encode_all(&records, false)
            .unwrap_err();

        assert_eq!(err, EncodeError::NilRecord { row: 1 });
        assert!(rows.is_empty());
    }

    #[test]
    fn a_leading_none_is_reported_before_any_output() {
        let records: Vec<Option<Item>> = vec![None];
        let mut rows: Vec<Vec<String>> = Vec::new();
        let err = Encoder::new(&mut rows)
            .encode_all(&records, false)
            .unwrap_err();

        assert_eq!(err, EncodeError::NilRecord { row: 0 });
        assert!(rows.is_empty());
    }

    #[test]
    fn scalar_elements_are_refused() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        let err = Encoder::new(&mut rows)
            .encode_all(&vec![1, 2, 3], false)
            .unwrap_err();

        assert_eq!(
            err,
            EncodeError::Shape {
                found: "i32".to_string(),
                mismatch: ShapeMismatch::ElementNotRecord,
            }
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn an_empty_container_writes_nothing() {
        let records: Vec<Item> = Vec::new();
        assert!(encode(&records, false).is_empty());
    }

    #[test]
    fn counting_twice_omits_the_same_columns() {
        let records = items(&["", "", ""]);
        let info = describe_record(&records[0]).unwrap();

        let mut omitted = Vec::new();
        for _ in 0..2 {
            let mut counters = OmissionCounters::new(&info.fields);
            let rows =
                for_each_record(&records, &mut CountEmpty::new(&info.fields, &mut counters))
                    .unwrap();
            omitted.push(counters.omitted(rows));
        }

        assert_eq!(omitted[0], vec![1]);
        assert_eq!(omitted[0], omitted[1]);
    }

    #[test]
    fn fields_without_omitempty_are_never_counted() {
        let info = describe_record(&items(&[""])[0]).unwrap();
        let mut counters = OmissionCounters::new(&info.fields);
        counters.record_empty(0);
        counters.record_empty(1);

        assert!(counters.any_to_omit());
        assert_eq!(counters.omitted(1), vec![1]);
    }

    #[test]
    fn elision_keeps_the_relative_order() {
        let info = describe_record(&items(&[""])[0]).unwrap();
        let mut fields = info.fields.clone();
        fields.extend(info.fields);

        let kept = elide(fields, &[1, 2]);

        let keys: Vec<&str> = kept.iter().map(|field| field.first_key()).collect();
        assert_eq!(keys, vec!["Name", "Tag"]);
    }

    #[derive(Serialize, Deserialize)]
    struct Address {
        city: String,
    }

    #[derive(Serialize, Deserialize)]
    struct Person {
        name: String,
        home: Option<Address>,
    }

    fn person(name: &str, city: Option<&str>) -> Person {
        Person {
            name: name.to_string(),
            home: city.map(|city| Address {
                city: city.to_string(),
            }),
        }
    }

    #[test]
    fn a_nested_record_missing_from_the_first_row_still_gets_its_columns() {
        let rows = encode(&vec![person("A", None), person("B", Some("X"))], false);
        assert_eq!(
            rows,
            vec![vec!["name", "home.city"], vec!["A", ""], vec!["B", "X"]]
        );
    }

    #[test]
    fn nested_columns_do_not_depend_on_row_order() {
        let rows = encode(&vec![person("B", Some("X")), person("A", None)], false);
        assert_eq!(
            rows,
            vec![vec!["name", "home.city"], vec!["B", "X"], vec!["A", ""]]
        );
    }

    #[derive(Serialize)]
    struct Other {
        x: u8,
        y: u8,
    }

    #[test]
    fn elements_of_different_types_are_refused_before_any_output() {
        let records = (Item { name: "A", tag: "t" }, Other { x: 1, y: 2 });
        let mut rows: Vec<Vec<String>> = Vec::new();
        let err = Encoder::new(&mut rows)
            .encode_all(&records, false)
            .unwrap_err();

        assert_eq!(
            err,
            EncodeError::Shape {
                found: "struct Other".to_string(),
                mismatch: ShapeMismatch::ElementNotRecord,
            }
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn options_of_the_same_record_mix_with_plain_records() {
        let records = (Some(Item { name: "A", tag: "" }), Item { name: "B", tag: "" });
        let rows = encode(&records, false);
        assert_eq!(rows, vec![vec!["Name"], vec!["A"], vec!["B"]]);
    }

    #[derive(Serialize, Deserialize)]
    struct Entry {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Tag,omitempty")]
        tag: String,
    }

    #[test]
    fn an_empty_slice_gets_the_header_of_its_type() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        Encoder::new(&mut rows)
            .encode_slice(&Vec::<Entry>::new(), false)
            .unwrap();

        assert_eq!(rows, vec![vec!["Name"]]);
    }

    #[test]
    fn an_empty_slice_without_headers_writes_nothing() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        Encoder::new(&mut rows)
            .encode_slice(&Vec::<Entry>::new(), true)
            .unwrap();

        assert!(rows.is_empty());
    }

    #[test]
    fn typed_slices_expand_nested_records_no_row_holds() {
        let mut rows: Vec<Vec<String>> = Vec::new();
        Encoder::new(&mut rows)
            .encode_slice(&[person("A", None)], false)
            .unwrap();

        assert_eq!(rows, vec![vec!["name", "home.city"], vec!["A", ""]]);
    }

    #[test]
    fn typed_slices_report_a_none_element_before_any_output() {
        let records = vec![Some(person("A", None)), None];
        let mut rows: Vec<Vec<String>> = Vec::new();
        let err = Encoder::new(&mut rows)
            .encode_slice(&records, false)
            .unwrap_err();

        assert_eq!(err, EncodeError::NilRecord { row: 1 });
        assert!(rows.is_empty());
    }
}
