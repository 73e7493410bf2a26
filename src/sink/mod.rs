#[cfg(feature = "csv")]
/// This module provides a CSV row sink built on the `csv` crate.
pub mod csv;
