use serde::{
    Serialize, Serializer,
    ser::{Impossible, SerializeSeq, SerializeTuple, SerializeTupleStruct},
};

use crate::error::{EncodeError, Result, ShapeMismatch};

/// Receives the elements of a container, in order.
pub trait VisitRecord {
    fn visit<T: Serialize + ?Sized>(&mut self, row: usize, record: &T) -> Result<()>;
}

/// Feeds every element of `records` to `visitor` and returns how many there were.
///
/// The container may sit behind an `Option` or a newtype; anything that does
/// not serialize as a sequence, tuple or tuple struct is refused.
pub fn for_each_record<C, V>(records: &C, visitor: &mut V) -> Result<usize>
where
    C: Serialize + ?Sized,
    V: VisitRecord,
{
    records.serialize(Walker { visitor })
}

struct Walker<'v, V> {
    visitor: &'v mut V,
}

impl<V> Walker<'_, V> {
    fn reject(&self, found: &str) -> EncodeError {
        EncodeError::shape(found, ShapeMismatch::NotContainer)
    }
}

struct Elements<'v, V> {
    visitor: &'v mut V,
    row: usize,
}

impl<V: VisitRecord> Elements<'_, V> {
    fn visit<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<()> {
        self.visitor.visit(self.row, record)?;
        self.row += 1;
        Ok(())
    }
}

impl<'v, V: VisitRecord> Serializer for Walker<'v, V> {
    type Ok = usize;
    type Error = EncodeError;
    type SerializeSeq = Elements<'v, V>;
    type SerializeTuple = Elements<'v, V>;
    type SerializeTupleStruct = Elements<'v, V>;
    type SerializeTupleVariant = Impossible<usize, EncodeError>;
    type SerializeMap = Impossible<usize, EncodeError>;
    type SerializeStruct = Impossible<usize, EncodeError>;
    type SerializeStructVariant = Impossible<usize, EncodeError>;

    reject_serialize!(
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str bytes
        none unit unit_struct unit_variant newtype_variant
        tuple_variant map struct struct_variant
    );

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<usize> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<usize> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Elements<'v, V>> {
        Ok(Elements {
            visitor: self.visitor,
            row: 0,
        })
    }

    fn serialize_tuple(self, _: usize) -> Result<Elements<'v, V>> {
        Ok(Elements {
            visitor: self.visitor,
            row: 0,
        })
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Elements<'v, V>> {
        Ok(Elements {
            visitor: self.visitor,
            row: 0,
        })
    }
}

impl<V: VisitRecord> SerializeSeq for Elements<'_, V> {
    type Ok = usize;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.visit(value)
    }

    fn end(self) -> Result<usize> {
        Ok(self.row)
    }
}

impl<V: VisitRecord> SerializeTuple for Elements<'_, V> {
    type Ok = usize;
    type Error = EncodeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.visit(value)
    }

    fn end(self) -> Result<usize> {
        Ok(self.row)
    }
}

impl<V: VisitRecord> SerializeTupleStruct for Elements<'_, V> {
    type Ok = usize;
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.visit(value)
    }

    fn end(self) -> Result<usize> {
        Ok(self.row)
    }
}
