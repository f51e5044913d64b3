//! Declarative struct definitions and the engine that decodes/encodes them.
//!
//! A definition is an ordered list of named fields; the order is the byte layout.
//! Each field is a numeric type, a fixed-size byte blob, a nested definition, or (for
//! decoding only) a custom reader closure. [`WriteDefinition`] is the subset without
//! custom readers, so a definition that cannot be encoded cannot be passed to
//! [`encode_struct`].
//!
//! ```
//! use structbuf::{Buffer, NumberType, ReadDefinition, WriteDefinition, Value, Record};
//!
//! let header = WriteDefinition::new()
//!     .number("id", NumberType::U32)
//!     .number("flag", NumberType::U8);
//! let def = WriteDefinition::new().nested("header", header).bytes("payload", 4);
//!
//! let mut h = Record::new();
//! h.insert("id".into(), Value::U32(1));
//! h.insert("flag".into(), Value::U8(255));
//! let mut rec = Record::new();
//! rec.insert("header".into(), Value::Struct(h));
//! rec.insert("payload".into(), Value::Bytes(vec![1, 2, 3, 4]));
//!
//! let mut buf = Buffer::new(9);
//! buf.write_struct(&def, &rec).unwrap();
//! let back = buf.read_struct(&ReadDefinition::from(def)).unwrap();
//! assert_eq!(back, rec);
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::buffer::{Buffer, BufferError};
use crate::types::NumberType;
use crate::value::{Record, Value};

/// Decode-only field reader: gets the buffer at the field's position, returns any value.
pub type CustomReader = Arc<dyn Fn(&mut Buffer) -> Result<Value, BufferError> + Send + Sync>;

/// Field kind for decoding.
#[derive(Clone)]
pub enum ReadField {
    Number(NumberType),
    /// Raw blob of exactly this many bytes.
    Bytes(usize),
    Nested(ReadDefinition),
    Custom(CustomReader),
}

/// Field kind for encoding. Same as [`ReadField`] minus custom readers.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteField {
    Number(NumberType),
    Bytes(usize),
    Nested(WriteDefinition),
}

impl fmt::Debug for ReadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadField::Number(t) => f.debug_tuple("Number").field(t).finish(),
            ReadField::Bytes(n) => f.debug_tuple("Bytes").field(n).finish(),
            ReadField::Nested(d) => f.debug_tuple("Nested").field(d).finish(),
            ReadField::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<NumberType> for ReadField {
    fn from(t: NumberType) -> Self {
        ReadField::Number(t)
    }
}

impl From<ReadDefinition> for ReadField {
    fn from(d: ReadDefinition) -> Self {
        ReadField::Nested(d)
    }
}

impl From<WriteField> for ReadField {
    fn from(f: WriteField) -> Self {
        match f {
            WriteField::Number(t) => ReadField::Number(t),
            WriteField::Bytes(n) => ReadField::Bytes(n),
            WriteField::Nested(d) => ReadField::Nested(d.into()),
        }
    }
}

impl From<NumberType> for WriteField {
    fn from(t: NumberType) -> Self {
        WriteField::Number(t)
    }
}

impl From<WriteDefinition> for WriteField {
    fn from(d: WriteDefinition) -> Self {
        WriteField::Nested(d)
    }
}

/// Ordered field layout used by [`decode_struct`].
#[derive(Debug, Clone, Default)]
pub struct ReadDefinition {
    fields: IndexMap<String, ReadField>,
}

/// Ordered field layout used by [`encode_struct`] (and, converted, by [`decode_struct`]).
#[derive(Debug, Clone, Default)]
pub struct WriteDefinition {
    fields: IndexMap<String, WriteField>,
}

impl ReadDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Re-adding an existing name replaces its kind in place.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<ReadField>) {
        self.fields.insert(name.into(), spec.into());
    }

    pub fn field(mut self, name: impl Into<String>, spec: impl Into<ReadField>) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn number(self, name: impl Into<String>, ty: NumberType) -> Self {
        self.field(name, ReadField::Number(ty))
    }

    pub fn bytes(self, name: impl Into<String>, size: usize) -> Self {
        self.field(name, ReadField::Bytes(size))
    }

    pub fn nested(self, name: impl Into<String>, def: ReadDefinition) -> Self {
        self.field(name, ReadField::Nested(def))
    }

    pub fn custom<F>(self, name: impl Into<String>, reader: F) -> Self
    where
        F: Fn(&mut Buffer) -> Result<Value, BufferError> + Send + Sync + 'static,
    {
        self.field(name, ReadField::Custom(Arc::new(reader)))
    }

    pub fn get(&self, name: &str) -> Option<&ReadField> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReadField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl WriteDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. Re-adding an existing name replaces its kind in place.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<WriteField>) {
        self.fields.insert(name.into(), spec.into());
    }

    pub fn field(mut self, name: impl Into<String>, spec: impl Into<WriteField>) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn number(self, name: impl Into<String>, ty: NumberType) -> Self {
        self.field(name, WriteField::Number(ty))
    }

    pub fn bytes(self, name: impl Into<String>, size: usize) -> Self {
        self.field(name, WriteField::Bytes(size))
    }

    pub fn nested(self, name: impl Into<String>, def: WriteDefinition) -> Self {
        self.field(name, WriteField::Nested(def))
    }

    pub fn get(&self, name: &str) -> Option<&WriteField> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WriteField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encoded size in bytes: the sum of every field's width.
    pub fn byte_len(&self) -> usize {
        self.fields
            .values()
            .map(|f| match f {
                WriteField::Number(t) => t.width(),
                WriteField::Bytes(n) => *n,
                WriteField::Nested(d) => d.byte_len(),
            })
            .sum()
    }
}

// Field order is layout, so equality is order-sensitive.
impl PartialEq for WriteDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.fields.iter().eq(other.fields.iter())
    }
}

impl From<WriteDefinition> for ReadDefinition {
    fn from(def: WriteDefinition) -> Self {
        ReadDefinition {
            fields: def.fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl TryFrom<&ReadDefinition> for WriteDefinition {
    type Error = BufferError;

    /// Fails with [`BufferError::CustomFieldNotWritable`] naming the first custom field.
    fn try_from(def: &ReadDefinition) -> Result<Self, Self::Error> {
        to_write(def, "")
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn to_write(def: &ReadDefinition, prefix: &str) -> Result<WriteDefinition, BufferError> {
    let mut out = WriteDefinition::new();
    for (name, spec) in def.iter() {
        let field = match spec {
            ReadField::Number(t) => WriteField::Number(*t),
            ReadField::Bytes(n) => WriteField::Bytes(*n),
            ReadField::Nested(inner) => WriteField::Nested(to_write(inner, &join(prefix, name))?),
            ReadField::Custom(_) => return Err(BufferError::CustomFieldNotWritable(join(prefix, name))),
        };
        out.insert(name, field);
    }
    Ok(out)
}

/// Decode one record from `buffer` at its read offset, field by field in definition order.
pub fn decode_struct(def: &ReadDefinition, buffer: &mut Buffer) -> Result<Record, BufferError> {
    let mut out = Record::with_capacity(def.len());
    for (name, spec) in def.iter() {
        trace!(field = name, offset = buffer.read_offset, "decode field");
        let v = match spec {
            ReadField::Number(ty) => buffer.read(*ty)?,
            ReadField::Bytes(n) => Value::Bytes(buffer.read_buffer(*n)?),
            ReadField::Nested(inner) => Value::Struct(decode_struct(inner, buffer)?),
            ReadField::Custom(reader) => reader(&mut *buffer)?,
        };
        out.insert(name.to_string(), v);
    }
    Ok(out)
}

/// Encode `record` into `buffer` at its write offset, field by field in definition order.
///
/// Numeric fields are clamped like any other write. Byte fields are copied verbatim,
/// whatever their length. Fields in `record` that the definition does not name are ignored.
pub fn encode_struct<'b>(
    def: &WriteDefinition,
    record: &Record,
    buffer: &'b mut Buffer,
) -> Result<&'b mut Buffer, BufferError> {
    encode_fields(def, record, buffer, "")?;
    Ok(buffer)
}

fn encode_fields(
    def: &WriteDefinition,
    record: &Record,
    buffer: &mut Buffer,
    prefix: &str,
) -> Result<(), BufferError> {
    for (name, spec) in def.iter() {
        let v = record
            .get(name)
            .ok_or_else(|| BufferError::MissingField(join(prefix, name)))?;
        trace!(field = name, offset = buffer.write_offset, "encode field");
        match spec {
            WriteField::Number(ty) => {
                buffer.write(*ty, v)?;
            }
            WriteField::Bytes(_) => {
                let bytes = v.as_bytes().ok_or_else(|| BufferError::mismatch("bytes", v))?;
                buffer.write_buffer(bytes);
            }
            WriteField::Nested(inner) => {
                let nested = v.as_struct().ok_or_else(|| BufferError::mismatch("struct", v))?;
                encode_fields(inner, nested, buffer, &join(prefix, name))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefining_a_field_keeps_its_position() {
        let def = WriteDefinition::new()
            .number("a", NumberType::U8)
            .number("b", NumberType::U8)
            .number("a", NumberType::U32);
        let names: Vec<_> = def.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(def.get("a"), Some(&WriteField::Number(NumberType::U32)));
        assert_eq!(def.byte_len(), 5);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab = WriteDefinition::new().number("a", NumberType::U8).number("b", NumberType::U16);
        let ba = WriteDefinition::new().number("b", NumberType::U16).number("a", NumberType::U8);
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn custom_field_cannot_become_writable() {
        let def = ReadDefinition::new()
            .number("a", NumberType::U8)
            .nested("inner", ReadDefinition::new().custom("c", |b| Ok(Value::U8(b.read_unsigned_byte()?))));
        let err = WriteDefinition::try_from(&def).unwrap_err();
        assert!(matches!(err, BufferError::CustomFieldNotWritable(ref p) if p == "inner.c"));
    }

    #[test]
    fn write_definition_converts_to_read() {
        let w = WriteDefinition::new()
            .nested("h", WriteDefinition::new().number("x", NumberType::S16))
            .bytes("p", 3);
        let r = ReadDefinition::from(w.clone());
        assert_eq!(WriteDefinition::try_from(&r).expect("no custom fields"), w);
    }
}
