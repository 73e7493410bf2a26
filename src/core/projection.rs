use serde::{
    Serialize, Serializer,
    ser::{Impossible, SerializeStruct},
};

use super::field::FieldInfo;
use crate::error::{EncodeError, Result, ShapeMismatch};

/// A column to fill: the row buffer slot and the field feeding it.
#[derive(Debug, Clone, Copy)]
pub struct Target<'f> {
    pub slot: usize,
    pub field: &'f FieldInfo,
}

/// Reads `field` off `record` as its CSV string.
///
/// `row` is only used to report a `None` record.
pub fn project<T: Serialize + ?Sized>(record: &T, row: usize, field: &FieldInfo) -> Result<String> {
    let mut out = [String::new()];
    project_into(record, row, &[Target { slot: 0, field }], &mut out)?;
    let [value] = out;
    Ok(value)
}

/// Fills `out[target.slot]` for every target in a single walk over `record`.
///
/// Slots are cleared first, so a value sitting behind a `None` nested struct
/// comes out as an empty string. A `None` record is a
/// [`EncodeError::NilRecord`].
pub fn project_into<T: Serialize + ?Sized>(
    record: &T,
    row: usize,
    targets: &[Target<'_>],
    out: &mut [String],
) -> Result<()> {
    for target in targets {
        out[target.slot].clear();
    }
    record.serialize(Projector {
        row,
        depth: 0,
        targets: targets.to_vec(),
        out,
    })
}

struct Projector<'o, 'f> {
    row: usize,
    depth: usize,
    targets: Vec<Target<'f>>,
    out: &'o mut [String],
}

impl Projector<'_, '_> {
    fn reject(&self, found: &str) -> EncodeError {
        match self.targets.first() {
            Some(target) if self.depth > 0 => EncodeError::UnsupportedFieldType {
                key: target.field.first_key().to_string(),
                kind: found.to_string(),
            },
            _ => EncodeError::shape(found, ShapeMismatch::NotRecord),
        }
    }
}

impl<'o, 'f> Serializer for Projector<'o, 'f> {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = Impossible<(), EncodeError>;
    type SerializeTuple = Impossible<(), EncodeError>;
    type SerializeTupleStruct = Impossible<(), EncodeError>;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = Impossible<(), EncodeError>;
    type SerializeStruct = ProjectStruct<'o, 'f>;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    reject_serialize!(
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str bytes
        unit unit_struct unit_variant newtype_variant
        seq tuple tuple_struct tuple_variant map struct_variant
    );

    fn serialize_none(self) -> Result<()> {
        if self.depth == 0 {
            return Err(EncodeError::NilRecord { row: self.row });
        }
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<ProjectStruct<'o, 'f>> {
        Ok(ProjectStruct {
            projector: self,
            index: 0,
        })
    }
}

struct ProjectStruct<'o, 'f> {
    projector: Projector<'o, 'f>,
    index: usize,
}

impl SerializeStruct for ProjectStruct<'_, '_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Result<()> {
        let index = self.index;
        self.index += 1;

        let depth = self.projector.depth;
        let (leaves, deeper): (Vec<Target<'_>>, Vec<Target<'_>>) = self
            .projector
            .targets
            .iter()
            .copied()
            .filter(|target| target.field.index_chain().get(depth) == Some(&index))
            .partition(|target| target.field.index_chain().len() == depth + 1);

        if let Some(first) = leaves.first() {
            let text = value
                .serialize(LeafSerializer)
                .map_err(|err| err.for_field(first.field.first_key()))?;
            for target in &leaves {
                self.projector.out[target.slot].clone_from(&text);
            }
        }

        if !deeper.is_empty() {
            value.serialize(Projector {
                row: self.projector.row,
                depth: depth + 1,
                targets: deeper,
                out: &mut *self.projector.out,
            })?;
        }
        Ok(())
    }

    fn skip_field(&mut self, _: &'static str) -> Result<()> {
        self.index += 1;
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Converts a leaf value to its canonical string form.
struct LeafSerializer;

impl LeafSerializer {
    fn reject(&self, found: &str) -> EncodeError {
        EncodeError::UnsupportedFieldType {
            key: String::new(),
            kind: found.to_string(),
        }
    }
}

impl Serializer for LeafSerializer {
    type Ok = String;
    type Error = EncodeError;
    type SerializeSeq = Impossible<String, EncodeError>;
    type SerializeTuple = Impossible<String, EncodeError>;
    type SerializeTupleStruct = Impossible<String, EncodeError>;
    type SerializeTupleVariant = Impossible<String, EncodeError>;
    type SerializeMap = Impossible<String, EncodeError>;
    type SerializeStruct = Impossible<String, EncodeError>;
    type SerializeStructVariant = Impossible<String, EncodeError>;

    reject_serialize!(
        bytes newtype_variant
        seq tuple tuple_struct tuple_variant map struct struct_variant
    );

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_none(self) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }
}
