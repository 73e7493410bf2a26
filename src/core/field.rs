use log::debug;
use serde::{
    Serialize, Serializer,
    de::DeserializeOwned,
    ser::{Impossible, SerializeStruct},
};
use serde_reflection::{ContainerFormat, Format, Named, Registry, Tracer, TracerConfig};

use super::shape::Shape;
use crate::error::{EncodeError, Result, ShapeMismatch};

const OMIT_EMPTY: &str = "omitempty";
const INLINE: &str = "inline";
const SKIP: &str = "-";

/// Annotation carried by a serde field key, e.g. `#[serde(rename = "tag,omitempty")]`.
///
/// Grammar: `key[|alias...][,option...]`. Options are `omitempty` and `inline`;
/// a key of `-` drops the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    pub keys: Vec<String>,
    pub omit_empty: bool,
    pub inline: bool,
}

impl FieldTag {
    pub fn parse(raw: &str) -> FieldTag {
        let mut parts = raw.split(',');
        let keys = parts
            .next()
            .unwrap_or_default()
            .split('|')
            .map(|key| key.trim().to_string())
            .collect();

        let mut tag = FieldTag {
            keys,
            omit_empty: false,
            inline: false,
        };
        for option in parts {
            match option.trim() {
                OMIT_EMPTY => tag.omit_empty = true,
                INLINE => tag.inline = true,
                _ => {}
            }
        }
        tag
    }

    pub fn is_skipped(&self) -> bool {
        self.keys.first().is_some_and(|key| key == SKIP)
    }

    fn first_key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or_default()
    }

    /// Key prefix of the columns of a struct nested under this field.
    fn nested_prefix(&self, prefix: &str) -> String {
        if self.inline {
            prefix.to_string()
        } else {
            format!("{prefix}{}.", self.first_key())
        }
    }

    fn leaf(&self, prefix: &str, index_chain: Vec<usize>, open: bool) -> FieldInfo {
        FieldInfo {
            keys: self.keys.iter().map(|key| format!("{prefix}{key}")).collect(),
            omit_empty: self.omit_empty,
            index_chain,
            open,
        }
    }
}

/// Describes one output column: its header keys, whether it may be omitted
/// when empty in every row, and the chain of field positions leading to its
/// value inside the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    keys: Vec<String>,
    omit_empty: bool,
    index_chain: Vec<usize>,
    /// Described from a `None`, so a nested struct may still hide behind it.
    open: bool,
}

impl FieldInfo {
    pub fn new(keys: Vec<String>, omit_empty: bool, index_chain: Vec<usize>) -> FieldInfo {
        FieldInfo {
            keys,
            omit_empty,
            index_chain,
            open: false,
        }
    }

    /// The header label of the column.
    pub fn first_key(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or_default()
    }

    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    pub fn index_chain(&self) -> &[usize] {
        &self.index_chain
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn is_nested_under(&self, parent: &FieldInfo) -> bool {
        self.index_chain.len() > parent.index_chain.len()
            && self.index_chain.starts_with(&parent.index_chain)
    }
}

/// Ordered column metadata of a record type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructInfo {
    pub fields: Vec<FieldInfo>,
}

impl StructInfo {
    pub fn headers(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| field.first_key().to_string())
            .collect()
    }

    /// Whether some column was described from a `None` only.
    pub fn has_open_fields(&self) -> bool {
        self.fields.iter().any(FieldInfo::is_open)
    }

    pub(crate) fn is_open_column(&self, key: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.open && field.first_key() == key)
    }

    /// Folds in the description of another record of the same type.
    ///
    /// An open column is replaced by the nested columns `other` found under it;
    /// it is closed once `other` holds a plain value there.
    pub fn merge(&mut self, other: &StructInfo) {
        if !self.has_open_fields() {
            return;
        }

        let mut merged = Vec::with_capacity(self.fields.len());
        for field in self.fields.drain(..) {
            if !field.open {
                merged.push(field);
                continue;
            }

            let nested: Vec<&FieldInfo> = other
                .fields
                .iter()
                .filter(|candidate| candidate.is_nested_under(&field))
                .collect();
            if nested.is_empty() {
                let open = other
                    .fields
                    .iter()
                    .find(|candidate| candidate.index_chain == field.index_chain)
                    .is_none_or(FieldInfo::is_open);
                merged.push(FieldInfo { open, ..field });
            } else {
                debug!(
                    "Expanding column {} into {} nested columns",
                    field.first_key(),
                    nested.len()
                );
                merged.extend(nested.into_iter().cloned());
            }
        }
        self.fields = merged;
    }
}

/// Builds the column metadata of `record` from its `Serialize` implementation.
///
/// Nested structs, directly or behind an `Option`, are flattened into their own
/// columns labelled `outer.inner` unless the outer field is tagged `inline`.
/// A nested `Option` that is `None` gives a single open column; see
/// [`StructInfo::merge`]. The record must be a struct or `Some(struct)`.
pub fn describe_record<T: Serialize + ?Sized>(record: &T) -> Result<StructInfo> {
    let mut info = StructInfo::default();
    record.serialize(Describer {
        prefix: String::new(),
        chain: Vec::new(),
        fields: &mut info.fields,
    })?;
    Ok(info)
}

/// Builds the column metadata of the record type `T`, without a value.
///
/// The type is traced through its `Deserialize` implementation, so every nested
/// struct is expanded whether or not some value holds it. Field order and keys
/// must be the same for `Serialize` and `Deserialize`, which holds unless a
/// field is renamed or skipped in one direction only.
pub fn describe_type<T: DeserializeOwned>() -> Result<StructInfo> {
    let mut tracer = Tracer::new(TracerConfig::default());
    let (format, _) = tracer
        .trace_simple_type::<T>()
        .map_err(|error| EncodeError::Layout(error.to_string()))?;
    let registry = tracer
        .registry()
        .map_err(|error| EncodeError::Layout(error.to_string()))?;

    let Some((name, fields)) = nested_struct(&registry, &format) else {
        return Err(EncodeError::shape(
            format_kind(&format),
            ShapeMismatch::ElementNotRecord,
        ));
    };

    let mut walker = TypeWalker {
        registry: &registry,
        path: Vec::new(),
        fields: Vec::new(),
    };
    walker.walk(name, fields, "", &[]);
    debug!("Traced {} columns of {}", walker.fields.len(), name);

    Ok(StructInfo {
        fields: walker.fields,
    })
}

/// Resolves `format` to the fields of a struct, through `Option` and newtypes.
fn nested_struct<'r>(
    registry: &'r Registry,
    format: &'r Format,
) -> Option<(&'r str, &'r [Named<Format>])> {
    match format {
        Format::Option(inner) => nested_struct(registry, inner),
        Format::TypeName(name) => match registry.get(name)? {
            ContainerFormat::Struct(fields) => Some((name.as_str(), fields.as_slice())),
            ContainerFormat::NewTypeStruct(inner) => nested_struct(registry, inner),
            _ => None,
        },
        _ => None,
    }
}

fn format_kind(format: &Format) -> String {
    match format {
        Format::TypeName(name) => name.clone(),
        Format::Str => "string".to_string(),
        Format::Seq(_) => "slice".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

struct TypeWalker<'r> {
    registry: &'r Registry,
    /// Structs being expanded, to stop on recursive types.
    path: Vec<&'r str>,
    fields: Vec<FieldInfo>,
}

impl<'r> TypeWalker<'r> {
    fn walk(
        &mut self,
        name: &'r str,
        fields: &'r [Named<Format>],
        prefix: &str,
        chain: &[usize],
    ) {
        self.path.push(name);
        for (index, field) in fields.iter().enumerate() {
            let tag = FieldTag::parse(&field.name);
            if tag.is_skipped() {
                continue;
            }

            let mut field_chain = chain.to_vec();
            field_chain.push(index);
            match nested_struct(self.registry, &field.value) {
                Some((nested, inner)) if !self.path.contains(&nested) => {
                    let prefix = tag.nested_prefix(prefix);
                    self.walk(nested, inner, &prefix, &field_chain);
                }
                _ => self.fields.push(tag.leaf(prefix, field_chain, false)),
            }
        }
        self.path.pop();
    }
}

struct Describer<'a> {
    prefix: String,
    chain: Vec<usize>,
    fields: &'a mut Vec<FieldInfo>,
}

impl Describer<'_> {
    fn reject(&self, found: &str) -> EncodeError {
        EncodeError::shape(found, ShapeMismatch::NotRecord)
    }
}

struct DescribeStruct<'a> {
    prefix: String,
    chain: Vec<usize>,
    fields: &'a mut Vec<FieldInfo>,
    index: usize,
}

impl DescribeStruct<'_> {
    fn next_chain(&mut self) -> Vec<usize> {
        let mut chain = self.chain.clone();
        chain.push(self.index);
        self.index += 1;
        chain
    }
}

impl<'a> Serializer for Describer<'a> {
    type Ok = ();
    type Error = EncodeError;
    type SerializeSeq = Impossible<(), EncodeError>;
    type SerializeTuple = Impossible<(), EncodeError>;
    type SerializeTupleStruct = Impossible<(), EncodeError>;
    type SerializeTupleVariant = Impossible<(), EncodeError>;
    type SerializeMap = Impossible<(), EncodeError>;
    type SerializeStruct = DescribeStruct<'a>;
    type SerializeStructVariant = Impossible<(), EncodeError>;

    reject_serialize!(
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str bytes
        none unit unit_struct unit_variant newtype_variant
        seq tuple tuple_struct tuple_variant map struct_variant
    );

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

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<DescribeStruct<'a>> {
        Ok(DescribeStruct {
            prefix: self.prefix,
            chain: self.chain,
            fields: self.fields,
            index: 0,
        })
    }
}

impl SerializeStruct for DescribeStruct<'_> {
    type Ok = ();
    type Error = EncodeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        let chain = self.next_chain();
        let tag = FieldTag::parse(key);
        if tag.is_skipped() {
            return Ok(());
        }

        let shape = Shape::of(value)?;
        if let Shape::Record(_) = shape.concrete() {
            return value.serialize(Describer {
                prefix: tag.nested_prefix(&self.prefix),
                chain,
                fields: &mut *self.fields,
            });
        }

        let leaf = tag.leaf(&self.prefix, chain, shape.is_nil());
        self.fields.push(leaf);
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<()> {
        let chain = self.next_chain();
        let tag = FieldTag::parse(key);
        if !tag.is_skipped() {
            let leaf = tag.leaf(&self.prefix, chain, true);
            self.fields.push(leaf);
        }
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}
