use std::fmt::{self, Display};

use serde::{
    Serialize, Serializer,
    ser::{
        SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
        SerializeTupleStruct, SerializeTupleVariant,
    },
};

use crate::error::{EncodeError, Result, ShapeMismatch};

/// The concrete shape of a serializable value, as seen through serde.
///
/// Only the outermost layer is classified: the fields of a record or the
/// elements of a container are never visited, so probing is cheap.
///
/// `Option<T>` plays the role of a nullable pointer. `Box`, `Rc`, `Arc`,
/// references and newtype wrappers serialize transparently and therefore never
/// show up as indirection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A struct with named fields.
    Record(&'static str),
    /// `Some(inner)`.
    Pointer(Box<Shape>),
    /// `None`.
    Nil,
    /// A variable-length sequence such as a `Vec` or a slice.
    Sequence,
    /// A fixed-size array, tuple or tuple struct.
    Array,
    Map,
    /// An enum variant carrying data.
    Enum,
    /// Any leaf value: numbers, strings, bools, unit types.
    Scalar(&'static str),
}

/// What the record check found: the record's type name and whether it was
/// reached through an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    pub name: &'static str,
    pub indirect: bool,
}

impl Shape {
    /// Probes the outermost shape of `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Shape> {
        value.serialize(ShapeProbe)
    }

    /// Strips one level of pointer indirection.
    pub fn concrete(&self) -> &Shape {
        match self {
            Shape::Pointer(inner) => inner.as_ref(),
            other => other,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Shape::Nil)
    }

    fn as_record(&self) -> Option<RecordShape> {
        match self {
            Shape::Record(name) => Some(RecordShape {
                name: *name,
                indirect: false,
            }),
            Shape::Pointer(inner) => match inner.as_ref() {
                Shape::Record(name) => Some(RecordShape {
                    name: *name,
                    indirect: true,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record(name) => write!(f, "struct {name}"),
            Shape::Pointer(inner) => write!(f, "*{inner}"),
            Shape::Nil => f.write_str("nil"),
            Shape::Sequence => f.write_str("slice"),
            Shape::Array => f.write_str("array"),
            Shape::Map => f.write_str("map"),
            Shape::Enum => f.write_str("enum"),
            Shape::Scalar(kind) => f.write_str(kind),
        }
    }
}

/// Succeeds iff the concrete shape is a slice or a fixed-size array.
pub fn ensure_container_shape(shape: &Shape) -> Result<()> {
    match shape.concrete() {
        Shape::Sequence | Shape::Array => Ok(()),
        _ => Err(EncodeError::shape(shape.to_string(), ShapeMismatch::NotContainer)),
    }
}

/// Succeeds iff the shape is a struct, directly or behind exactly one `Option`.
pub fn ensure_record_shape(shape: &Shape) -> Result<RecordShape> {
    shape
        .as_record()
        .ok_or_else(|| EncodeError::shape(shape.to_string(), ShapeMismatch::NotRecord))
}

/// Succeeds iff a container element is a struct after at most one dereference.
pub fn ensure_element_shape(shape: &Shape) -> Result<RecordShape> {
    shape
        .as_record()
        .ok_or_else(|| EncodeError::shape(shape.to_string(), ShapeMismatch::ElementNotRecord))
}

struct ShapeProbe;

/// Accepts and discards the content of any compound value.
struct Discard(Shape);

impl Serializer for ShapeProbe {
    type Ok = Shape;
    type Error = EncodeError;
    type SerializeSeq = Discard;
    type SerializeTuple = Discard;
    type SerializeTupleStruct = Discard;
    type SerializeTupleVariant = Discard;
    type SerializeMap = Discard;
    type SerializeStruct = Discard;
    type SerializeStructVariant = Discard;

    fn serialize_bool(self, _: bool) -> Result<Shape> {
        Ok(Shape::Scalar("bool"))
    }

    fn serialize_i8(self, _: i8) -> Result<Shape> {
        Ok(Shape::Scalar("i8"))
    }

    fn serialize_i16(self, _: i16) -> Result<Shape> {
        Ok(Shape::Scalar("i16"))
    }

    fn serialize_i32(self, _: i32) -> Result<Shape> {
        Ok(Shape::Scalar("i32"))
    }

    fn serialize_i64(self, _: i64) -> Result<Shape> {
        Ok(Shape::Scalar("i64"))
    }

    fn serialize_i128(self, _: i128) -> Result<Shape> {
        Ok(Shape::Scalar("i128"))
    }

    fn serialize_u8(self, _: u8) -> Result<Shape> {
        Ok(Shape::Scalar("u8"))
    }

    fn serialize_u16(self, _: u16) -> Result<Shape> {
        Ok(Shape::Scalar("u16"))
    }

    fn serialize_u32(self, _: u32) -> Result<Shape> {
        Ok(Shape::Scalar("u32"))
    }

    fn serialize_u64(self, _: u64) -> Result<Shape> {
        Ok(Shape::Scalar("u64"))
    }

    fn serialize_u128(self, _: u128) -> Result<Shape> {
        Ok(Shape::Scalar("u128"))
    }

    fn serialize_f32(self, _: f32) -> Result<Shape> {
        Ok(Shape::Scalar("f32"))
    }

    fn serialize_f64(self, _: f64) -> Result<Shape> {
        Ok(Shape::Scalar("f64"))
    }

    fn serialize_char(self, _: char) -> Result<Shape> {
        Ok(Shape::Scalar("char"))
    }

    fn serialize_str(self, _: &str) -> Result<Shape> {
        Ok(Shape::Scalar("string"))
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<Shape> {
        Ok(Shape::Scalar("bytes"))
    }

    fn serialize_none(self) -> Result<Shape> {
        Ok(Shape::Nil)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Shape> {
        Ok(Shape::Pointer(Box::new(value.serialize(ShapeProbe)?)))
    }

    fn serialize_unit(self) -> Result<Shape> {
        Ok(Shape::Scalar("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Shape> {
        Ok(Shape::Scalar(name))
    }

    fn serialize_unit_variant(self, name: &'static str, _: u32, _: &'static str) -> Result<Shape> {
        Ok(Shape::Scalar(name))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Shape> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Shape> {
        Ok(Shape::Enum)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Discard> {
        Ok(Discard(Shape::Sequence))
    }

    fn serialize_tuple(self, _: usize) -> Result<Discard> {
        Ok(Discard(Shape::Array))
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Discard> {
        Ok(Discard(Shape::Array))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Discard> {
        Ok(Discard(Shape::Enum))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Discard> {
        Ok(Discard(Shape::Map))
    }

    fn serialize_struct(self, name: &'static str, _: usize) -> Result<Discard> {
        Ok(Discard(Shape::Record(name)))
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Discard> {
        Ok(Discard(Shape::Enum))
    }
}

impl SerializeSeq for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeTuple for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeTupleStruct for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeTupleVariant for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeMap for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeStruct for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}

impl SerializeStructVariant for Discard {
    type Ok = Shape;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, _: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<Shape> {
        Ok(self.0)
    }
}
