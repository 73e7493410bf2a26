//! CSV output for encoded rows.
//!
//! The encoders produce rows of strings; turning them into CSV text (quoting,
//! escaping, delimiters and line terminators) is the job of [`CsvRowWriter`],
//! a [`RowSink`](crate::core::sink::RowSink) over a `csv::Writer`.
//!
//! The writer follows the builder pattern for configuration.
//!
//! # Ownership and Borrowing Considerations
//!
//! A `CsvRowWriter` owns its destination. To read the output back, either hand
//! the encoder a `&mut CsvRowWriter` and call
//! [`CsvRowWriter::into_inner`] afterwards, or write into a `&mut Vec<u8>`
//! that outlives the writer.
//!
//! # Examples
//!
//! ```
//! use csv_marshal::{
//!     encoder::Encoder,
//!     sink::csv::{QuoteStyle, csv_writer::CsvRowWriterBuilder},
//! };
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: String,
//!     age: u8,
//!     occupation: String,
//! }
//!
//! let people = vec![
//!     Person {
//!         name: "Alice".to_string(),
//!         age: 28,
//!         occupation: "Engineer".to_string(),
//!     },
//!     Person {
//!         name: "Bob".to_string(),
//!         age: 35,
//!         occupation: "Designer; UX".to_string(),
//!     },
//! ];
//!
//! let mut writer = CsvRowWriterBuilder::new()
//!     .delimiter(b';')
//!     .quote_style(QuoteStyle::Necessary)
//!     .from_writer(vec![]);
//!
//! Encoder::new(&mut writer).encode_all(&people, false).unwrap();
//!
//! let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
//! assert_eq!(
//!     data,
//!     "name;age;occupation\nAlice;28;Engineer\nBob;35;\"Designer; UX\"\n"
//! );
//! ```

pub use ::csv::{QuoteStyle, Terminator};

#[doc(inline)]
pub use csv_writer::{CsvRowWriter, CsvRowWriterBuilder};

/// A module providing a row sink that writes CSV text.
pub mod csv_writer;
