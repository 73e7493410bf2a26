/// Generates `Serializer` methods that refuse the value with `self.reject(kind)`.
///
/// The implementing type must provide an inherent `reject(&self, &str) -> EncodeError`
/// and use `Impossible` for every compound type it rejects.
macro_rules! reject_serialize {
    (bool) => {
        fn serialize_bool(self, _: bool) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("bool"))
        }
    };
    (i8) => {
        fn serialize_i8(self, _: i8) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("i8"))
        }
    };
    (i16) => {
        fn serialize_i16(self, _: i16) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("i16"))
        }
    };
    (i32) => {
        fn serialize_i32(self, _: i32) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("i32"))
        }
    };
    (i64) => {
        fn serialize_i64(self, _: i64) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("i64"))
        }
    };
    (i128) => {
        fn serialize_i128(self, _: i128) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("i128"))
        }
    };
    (u8) => {
        fn serialize_u8(self, _: u8) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("u8"))
        }
    };
    (u16) => {
        fn serialize_u16(self, _: u16) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("u16"))
        }
    };
    (u32) => {
        fn serialize_u32(self, _: u32) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("u32"))
        }
    };
    (u64) => {
        fn serialize_u64(self, _: u64) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("u64"))
        }
    };
    (u128) => {
        fn serialize_u128(self, _: u128) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("u128"))
        }
    };
    (f32) => {
        fn serialize_f32(self, _: f32) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("f32"))
        }
    };
    (f64) => {
        fn serialize_f64(self, _: f64) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("f64"))
        }
    };
    (char) => {
        fn serialize_char(self, _: char) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("char"))
        }
    };
    (str) => {
        fn serialize_str(self, _: &str) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("string"))
        }
    };
    (bytes) => {
        fn serialize_bytes(self, _: &[u8]) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("bytes"))
        }
    };
    (none) => {
        fn serialize_none(self) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("nil"))
        }
    };
    (unit) => {
        fn serialize_unit(self) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("unit"))
        }
    };
    (unit_struct) => {
        fn serialize_unit_struct(self, name: &'static str) -> $crate::error::Result<Self::Ok> {
            Err(self.reject(name))
        }
    };
    (unit_variant) => {
        fn serialize_unit_variant(
            self,
            name: &'static str,
            _: u32,
            _: &'static str,
        ) -> $crate::error::Result<Self::Ok> {
            Err(self.reject(name))
        }
    };
    (newtype_variant) => {
        fn serialize_newtype_variant<T: serde::Serialize + ?Sized>(
            self,
            _: &'static str,
            _: u32,
            _: &'static str,
            _: &T,
        ) -> $crate::error::Result<Self::Ok> {
            Err(self.reject("enum"))
        }
    };
    (seq) => {
        fn serialize_seq(self, _: Option<usize>) -> $crate::error::Result<Self::SerializeSeq> {
            Err(self.reject("slice"))
        }
    };
    (tuple) => {
        fn serialize_tuple(self, _: usize) -> $crate::error::Result<Self::SerializeTuple> {
            Err(self.reject("array"))
        }
    };
    (tuple_struct) => {
        fn serialize_tuple_struct(
            self,
            _: &'static str,
            _: usize,
        ) -> $crate::error::Result<Self::SerializeTupleStruct> {
            Err(self.reject("array"))
        }
    };
    (tuple_variant) => {
        fn serialize_tuple_variant(
            self,
            _: &'static str,
            _: u32,
            _: &'static str,
            _: usize,
        ) -> $crate::error::Result<Self::SerializeTupleVariant> {
            Err(self.reject("enum"))
        }
    };
    (map) => {
        fn serialize_map(self, _: Option<usize>) -> $crate::error::Result<Self::SerializeMap> {
            Err(self.reject("map"))
        }
    };
    (struct) => {
        fn serialize_struct(
            self,
            name: &'static str,
            _: usize,
        ) -> $crate::error::Result<Self::SerializeStruct> {
            Err(self.reject(&format!("struct {}", name)))
        }
    };
    (struct_variant) => {
        fn serialize_struct_variant(
            self,
            _: &'static str,
            _: u32,
            _: &'static str,
            _: usize,
        ) -> $crate::error::Result<Self::SerializeStructVariant> {
            Err(self.reject("enum"))
        }
    };
    ($($kind:tt)+) => {
        $(reject_serialize!($kind);)+
    };
}

/// Walks the elements of a container record by record
pub mod container;

/// Column metadata derived from a record's `Serialize` implementation
pub mod field;

/// Reads single fields off a record as strings
pub mod projection;

/// Destination of encoded rows
pub mod sink;

/// Shape checks on encoder inputs
pub mod shape;
