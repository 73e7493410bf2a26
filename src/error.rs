use std::fmt::{self, Display};

use thiserror::Error;

/// Which shape check a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMismatch {
    /// The value is neither a sequence nor a fixed-size array.
    NotContainer,
    /// The value is neither a struct nor an `Option` of a struct.
    NotRecord,
    /// The container elements are not structs.
    ElementNotRecord,
}

impl Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ShapeMismatch::NotContainer => "only slice or array supported",
            ShapeMismatch::NotRecord => "only struct or pointer to struct supported",
            ShapeMismatch::ElementNotRecord => "only struct elements supported",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Encoding error
pub enum EncodeError {
    #[error("cannot use {found}, {mismatch}")]
    Shape {
        found: String,
        mismatch: ShapeMismatch,
    },

    #[error("source closed before yielding a record")]
    EmptySource,

    #[error("record {row} is a nil reference")]
    NilRecord { row: usize },

    #[error("field `{key}` of type {kind} cannot be converted to a string")]
    UnsupportedFieldType { key: String, kind: String },

    #[error("record {row} holds a struct in column `{key}`, which was empty in the first record")]
    NestedAfterEmpty { row: usize, key: String },

    #[error("cannot derive columns: {0}")]
    Layout(String),

    #[error("RowSink from: {0}")]
    Sink(String),

    #[error("Serialize from: {0}")]
    Serialize(String),
}

impl EncodeError {
    pub(crate) fn shape(found: impl Into<String>, mismatch: ShapeMismatch) -> Self {
        EncodeError::Shape {
            found: found.into(),
            mismatch,
        }
    }

    /// Attributes a leaf conversion failure to the column it was read for.
    pub(crate) fn for_field(self, key: &str) -> Self {
        match self {
            EncodeError::UnsupportedFieldType { kind, .. } => EncodeError::UnsupportedFieldType {
                key: key.to_string(),
                kind,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Serialize(msg.to_string())
    }
}

/// Result alias used across the crate.
pub type Result<T, E = EncodeError> = std::result::Result<T, E>;
