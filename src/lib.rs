#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # CSV Marshal

 Encode collections and streams of [serde](https://serde.rs) records into CSV,
 with column names, order and omission driven by per-field tags.

 ## Core Concepts

- **Record:** any `Serialize` struct, or an `Option` of one. Each record becomes one row.
- **Field tag:** the serde key of a field (`#[serde(rename = "...")]`), read as
  `key[|alias...][,option...]`. `omitempty` lets a column disappear when it is
  empty in every row, `inline` flattens a nested struct without a key prefix,
  and `-` drops the field.
- **Encoder:** turns records into rows of strings. `encode_all` takes a whole
  container and can omit empty columns; `encode_slice` does the same with the
  columns traced from the record type (the `to_writer` family uses it);
  `encode_iter` and `encode_channel` take records as they arrive and write the
  header right away.
- **RowSink:** receives the rows. `CsvRowWriter` writes them as CSV text with
  the `csv` crate.

 ## Features

| **Feature** | **Description**                                                    |
|-------------|--------------------------------------------------------------------|
| csv         | Enables `CsvRowWriter` and the `to_writer` family (default)        |
| channel     | Enables encoding from a tokio `mpsc::Receiver`                     |
| full        | Enables all available features                                     |

 ## Getting Started

```rust
# use serde::{Deserialize, Serialize};
#[derive(Serialize, Deserialize)]
struct Car {
    year: u16,
    make: String,
    model: String,
    #[serde(rename = "description,omitempty")]
    description: String,
}

fn main() -> Result<(), csv_marshal::EncodeError> {
    let cars = vec![
        Car { year: 1948, make: "Porsche".into(), model: "356".into(), description: "".into() },
        Car { year: 1995, make: "Peugeot".into(), model: "205".into(), description: "".into() },
    ];

    let csv = csv_marshal::to_string(&cars)?;

    assert_eq!(csv, "year,make,model\n1948,Porsche,356\n1995,Peugeot,205\n");
    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core record introspection, projection and sink abstractions
pub mod core;

/// Error types for encoding
pub mod error;

#[doc(inline)]
pub use error::*;

/// Bounded and streaming encoders
pub mod encoder;

#[doc(inline)]
pub use encoder::Encoder;

#[cfg(feature = "csv")]
#[doc(inline)]
pub use encoder::{iter_to_writer, to_bytes, to_string, to_writer, to_writer_without_headers};

#[cfg(all(feature = "csv", feature = "channel"))]
#[doc(inline)]
pub use encoder::channel_to_writer;

/// Set of row sinks (for example: csv writer)
pub mod sink;
