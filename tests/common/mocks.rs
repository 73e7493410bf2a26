//! Mock versions of std::fs::File and of a row sink.
use mockall::mock;

use csv_marshal::{EncodeError, core::sink::RowSink};
use std::io::{self, Write};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Sink {}
    impl RowSink for Sink {
        fn write_row(&mut self, fields: &[String]) -> Result<(), EncodeError>;
        fn flush(&mut self) -> Result<(), EncodeError>;
        fn last_error(&self) -> Option<EncodeError>;
    }
}
