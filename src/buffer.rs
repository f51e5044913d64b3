//! Cursor-based byte buffer with typed, endianness-aware accessors.
//!
//! A [`Buffer`] owns a growable byte region and two independent cursors: reads advance
//! `read_offset`, writes advance `write_offset`. Every multi-byte access uses the buffer's
//! current [`Endianness`].
//!
//! Numeric writes never fail: values outside the target type's range are clamped to the
//! nearest bound, and writes past the end grow the region. Reads past the end are errors.

use std::fmt;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

use crate::half::{f16_bits_to_f32, f32_to_f16_bits};
use crate::structs::{decode_struct, encode_struct, ReadDefinition, WriteDefinition};
use crate::types::{Endianness, NumberType};
use crate::value::{Record, Value};

#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("out of bounds: {width} byte(s) at offset {offset}, buffer length {len}")]
    OutOfBounds { offset: usize, width: usize, len: usize },
    #[error("unknown binary type '{0}'")]
    UnknownType(String),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("custom field '{0}' has no writer")]
    CustomFieldNotWritable(String),
    #[error("definition: {0}")]
    Definition(String),
}

impl BufferError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &Value) -> Self {
        BufferError::TypeMismatch { expected: expected.into(), found: found.kind().to_string() }
    }
}

/// Types that can be embedded in a buffer as a whole object.
pub trait Serializable: Sized {
    /// Produce the object's bytes as a standalone buffer.
    fn serialize(&self) -> Buffer;
    /// Rebuild the object by reading from `buffer` at its read offset.
    fn deserialize(buffer: &mut Buffer) -> Result<Self, BufferError>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    data: Vec<u8>,
    pub endianness: Endianness,
    pub read_offset: usize,
    pub write_offset: usize,
}

impl Buffer {
    /// Zero-filled buffer of `size` bytes.
    pub fn new(size: usize) -> Self {
        Buffer::from(vec![0u8; size])
    }

    /// Read `source` to its end and wrap the bytes.
    pub fn from_reader<R: Read>(mut source: R) -> Result<Self, BufferError> {
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;
        Ok(Buffer::from(data))
    }

    /// Concatenate several regions into one buffer.
    pub fn merge(parts: &[&[u8]]) -> Self {
        Buffer::from(parts.concat())
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn readable(&self) -> bool {
        self.read_offset < self.data.len()
    }

    pub fn writable(&self) -> bool {
        self.write_offset < self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Borrow `width` bytes at the read offset and advance past them.
    fn take(&mut self, width: usize) -> Result<&[u8], BufferError> {
        let start = self.read_offset;
        let end = start
            .checked_add(width)
            .filter(|&end| end <= self.data.len())
            .ok_or(BufferError::OutOfBounds { offset: start, width, len: self.data.len() })?;
        self.read_offset = end;
        Ok(&self.data[start..end])
    }

    /// Slot of `width` bytes at the write offset, growing the region if needed.
    fn put(&mut self, width: usize) -> &mut [u8] {
        let start = self.write_offset;
        let end = start + width;
        if end > self.data.len() {
            debug!(old_len = self.data.len(), new_len = end, "growing buffer");
            self.data.resize(end, 0);
        }
        self.write_offset = end;
        &mut self.data[start..end]
    }

    // ---- integers ----

    pub fn read_signed_byte(&mut self) -> Result<i8, BufferError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn write_signed_byte(&mut self, value: i128) -> &mut Self {
        let v = NumberType::S8.clamp_int(value) as i8;
        self.put(1)[0] = v as u8;
        self
    }

    pub fn read_unsigned_byte(&mut self) -> Result<u8, BufferError> {
        Ok(self.take(1)?[0])
    }

    pub fn write_unsigned_byte(&mut self, value: i128) -> &mut Self {
        let v = NumberType::U8.clamp_int(value) as u8;
        self.put(1)[0] = v;
        self
    }

    pub fn read_signed_short(&mut self) -> Result<i16, BufferError> {
        let order = self.endianness;
        let b = self.take(2)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_i16(b),
            Endianness::Little => LittleEndian::read_i16(b),
        })
    }

    pub fn write_signed_short(&mut self, value: i128) -> &mut Self {
        let v = NumberType::S16.clamp_int(value) as i16;
        let order = self.endianness;
        let b = self.put(2);
        match order {
            Endianness::Big => BigEndian::write_i16(b, v),
            Endianness::Little => LittleEndian::write_i16(b, v),
        }
        self
    }

    pub fn read_unsigned_short(&mut self) -> Result<u16, BufferError> {
        let order = self.endianness;
        let b = self.take(2)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_u16(b),
            Endianness::Little => LittleEndian::read_u16(b),
        })
    }

    pub fn write_unsigned_short(&mut self, value: i128) -> &mut Self {
        let v = NumberType::U16.clamp_int(value) as u16;
        let order = self.endianness;
        let b = self.put(2);
        match order {
            Endianness::Big => BigEndian::write_u16(b, v),
            Endianness::Little => LittleEndian::write_u16(b, v),
        }
        self
    }

    pub fn read_signed_24(&mut self) -> Result<i32, BufferError> {
        let order = self.endianness;
        let b = self.take(3)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_i24(b),
            Endianness::Little => LittleEndian::read_i24(b),
        })
    }

    pub fn write_signed_24(&mut self, value: i128) -> &mut Self {
        let v = NumberType::S24.clamp_int(value) as i32;
        let order = self.endianness;
        let b = self.put(3);
        match order {
            Endianness::Big => BigEndian::write_i24(b, v),
            Endianness::Little => LittleEndian::write_i24(b, v),
        }
        self
    }

    pub fn read_unsigned_24(&mut self) -> Result<u32, BufferError> {
        let order = self.endianness;
        let b = self.take(3)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_u24(b),
            Endianness::Little => LittleEndian::read_u24(b),
        })
    }

    pub fn write_unsigned_24(&mut self, value: i128) -> &mut Self {
        let v = NumberType::U24.clamp_int(value) as u32;
        let order = self.endianness;
        let b = self.put(3);
        match order {
            Endianness::Big => BigEndian::write_u24(b, v),
            Endianness::Little => LittleEndian::write_u24(b, v),
        }
        self
    }

    pub fn read_signed_integer(&mut self) -> Result<i32, BufferError> {
        let order = self.endianness;
        let b = self.take(4)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_i32(b),
            Endianness::Little => LittleEndian::read_i32(b),
        })
    }

    pub fn write_signed_integer(&mut self, value: i128) -> &mut Self {
        let v = NumberType::S32.clamp_int(value) as i32;
        let order = self.endianness;
        let b = self.put(4);
        match order {
            Endianness::Big => BigEndian::write_i32(b, v),
            Endianness::Little => LittleEndian::write_i32(b, v),
        }
        self
    }

    pub fn read_unsigned_integer(&mut self) -> Result<u32, BufferError> {
        let order = self.endianness;
        let b = self.take(4)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_u32(b),
            Endianness::Little => LittleEndian::read_u32(b),
        })
    }

    pub fn write_unsigned_integer(&mut self, value: i128) -> &mut Self {
        let v = NumberType::U32.clamp_int(value) as u32;
        let order = self.endianness;
        let b = self.put(4);
        match order {
            Endianness::Big => BigEndian::write_u32(b, v),
            Endianness::Little => LittleEndian::write_u32(b, v),
        }
        self
    }

    pub fn read_signed_long(&mut self) -> Result<i64, BufferError> {
        let order = self.endianness;
        let b = self.take(8)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_i64(b),
            Endianness::Little => LittleEndian::read_i64(b),
        })
    }

    pub fn write_signed_long(&mut self, value: i128) -> &mut Self {
        let v = NumberType::S64.clamp_int(value) as i64;
        let order = self.endianness;
        let b = self.put(8);
        match order {
            Endianness::Big => BigEndian::write_i64(b, v),
            Endianness::Little => LittleEndian::write_i64(b, v),
        }
        self
    }

    pub fn read_unsigned_long(&mut self) -> Result<u64, BufferError> {
        let order = self.endianness;
        let b = self.take(8)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_u64(b),
            Endianness::Little => LittleEndian::read_u64(b),
        })
    }

    pub fn write_unsigned_long(&mut self, value: i128) -> &mut Self {
        let v = NumberType::U64.clamp_int(value) as u64;
        let order = self.endianness;
        let b = self.put(8);
        match order {
            Endianness::Big => BigEndian::write_u64(b, v),
            Endianness::Little => LittleEndian::write_u64(b, v),
        }
        self
    }

    // ---- floats ----

    pub fn read_half(&mut self) -> Result<f32, BufferError> {
        let order = self.endianness;
        let b = self.take(2)?;
        let bits = match order {
            Endianness::Big => BigEndian::read_u16(b),
            Endianness::Little => LittleEndian::read_u16(b),
        };
        Ok(f16_bits_to_f32(bits))
    }

    pub fn write_half(&mut self, value: f64) -> &mut Self {
        let bits = f32_to_f16_bits(NumberType::Half.clamp_float(value) as f32);
        let order = self.endianness;
        let b = self.put(2);
        match order {
            Endianness::Big => BigEndian::write_u16(b, bits),
            Endianness::Little => LittleEndian::write_u16(b, bits),
        }
        self
    }

    pub fn read_float(&mut self) -> Result<f32, BufferError> {
        let order = self.endianness;
        let b = self.take(4)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_f32(b),
            Endianness::Little => LittleEndian::read_f32(b),
        })
    }

    pub fn write_float(&mut self, value: f64) -> &mut Self {
        let v = NumberType::Float.clamp_float(value) as f32;
        let order = self.endianness;
        let b = self.put(4);
        match order {
            Endianness::Big => BigEndian::write_f32(b, v),
            Endianness::Little => LittleEndian::write_f32(b, v),
        }
        self
    }

    pub fn read_double(&mut self) -> Result<f64, BufferError> {
        let order = self.endianness;
        let b = self.take(8)?;
        Ok(match order {
            Endianness::Big => BigEndian::read_f64(b),
            Endianness::Little => LittleEndian::read_f64(b),
        })
    }

    pub fn write_double(&mut self, value: f64) -> &mut Self {
        let order = self.endianness;
        let b = self.put(8);
        match order {
            Endianness::Big => BigEndian::write_f64(b, value),
            Endianness::Little => LittleEndian::write_f64(b, value),
        }
        self
    }

    // ---- raw ranges ----

    /// Copy `size` bytes out of the buffer at the read offset.
    pub fn read_buffer(&mut self, size: usize) -> Result<Vec<u8>, BufferError> {
        Ok(self.take(size)?.to_vec())
    }

    /// Copy `bytes` in at the write offset, growing the region if they do not fit.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> &mut Self {
        self.put(bytes.len()).copy_from_slice(bytes);
        self
    }

    // ---- dynamic dispatch ----

    /// Read one value of type `ty`.
    pub fn read(&mut self, ty: NumberType) -> Result<Value, BufferError> {
        Ok(match ty {
            NumberType::S8 => Value::S8(self.read_signed_byte()?),
            NumberType::U8 => Value::U8(self.read_unsigned_byte()?),
            NumberType::S16 => Value::S16(self.read_signed_short()?),
            NumberType::U16 => Value::U16(self.read_unsigned_short()?),
            NumberType::S24 => Value::S24(self.read_signed_24()?),
            NumberType::U24 => Value::U24(self.read_unsigned_24()?),
            NumberType::S32 => Value::S32(self.read_signed_integer()?),
            NumberType::U32 => Value::U32(self.read_unsigned_integer()?),
            NumberType::S64 => Value::S64(self.read_signed_long()?),
            NumberType::U64 => Value::U64(self.read_unsigned_long()?),
            NumberType::Half => Value::Half(self.read_half()?),
            NumberType::Float => Value::Float(self.read_float()?),
            NumberType::Double => Value::Double(self.read_double()?),
        })
    }

    /// Write `value` as type `ty`. Any numeric value is accepted and clamped into `ty`;
    /// floats written to integer types are truncated toward zero first.
    pub fn write(&mut self, ty: NumberType, value: &Value) -> Result<&mut Self, BufferError> {
        let int = || {
            value
                .as_i128()
                .or_else(|| value.as_f64().map(|f| f as i128))
                .ok_or_else(|| BufferError::mismatch(ty.tag(), value))
        };
        let float = || value.as_f64().ok_or_else(|| BufferError::mismatch(ty.tag(), value));
        Ok(match ty {
            NumberType::S8 => self.write_signed_byte(int()?),
            NumberType::U8 => self.write_unsigned_byte(int()?),
            NumberType::S16 => self.write_signed_short(int()?),
            NumberType::U16 => self.write_unsigned_short(int()?),
            NumberType::S24 => self.write_signed_24(int()?),
            NumberType::U24 => self.write_unsigned_24(int()?),
            NumberType::S32 => self.write_signed_integer(int()?),
            NumberType::U32 => self.write_unsigned_integer(int()?),
            NumberType::S64 => self.write_signed_long(int()?),
            NumberType::U64 => self.write_unsigned_long(int()?),
            NumberType::Half => self.write_half(float()?),
            NumberType::Float => self.write_float(float()?),
            NumberType::Double => self.write_double(float()?),
        })
    }

    /// [`read`](Self::read) with a type tag such as `"u16"`.
    pub fn read_tagged(&mut self, tag: &str) -> Result<Value, BufferError> {
        let ty = NumberType::parse(tag)?;
        self.read(ty)
    }

    /// [`write`](Self::write) with a type tag such as `"u16"`.
    pub fn write_tagged(&mut self, tag: &str, value: &Value) -> Result<&mut Self, BufferError> {
        let ty = NumberType::parse(tag)?;
        self.write(ty, value)
    }

    // ---- arrays ----

    pub fn read_array(&mut self, ty: NumberType, length: usize) -> Result<Vec<Value>, BufferError> {
        (0..length).map(|_| self.read(ty)).collect()
    }

    pub fn write_array(&mut self, ty: NumberType, values: &[Value]) -> Result<&mut Self, BufferError> {
        for v in values {
            self.write(ty, v)?;
        }
        Ok(self)
    }

    // ---- characters ----

    pub fn read_char(&mut self) -> Result<char, BufferError> {
        Ok(self.read_unsigned_byte()? as char)
    }

    /// Write one character as a byte; code points above 255 clamp to 255.
    pub fn write_char(&mut self, c: char) -> &mut Self {
        self.write_unsigned_byte(c as u32 as i128)
    }

    pub fn read_ascii(&mut self, length: usize) -> Result<String, BufferError> {
        Ok(self.take(length)?.iter().map(|&b| b as char).collect())
    }

    /// Write each character's code point masked to its low byte.
    pub fn write_ascii(&mut self, text: &str) -> &mut Self {
        for c in text.chars() {
            self.write_unsigned_byte((c as u32 & 0xff) as i128);
        }
        self
    }

    // ---- structs and objects ----

    pub fn read_struct(&mut self, def: &ReadDefinition) -> Result<Record, BufferError> {
        decode_struct(def, self)
    }

    pub fn write_struct(&mut self, def: &WriteDefinition, record: &Record) -> Result<&mut Self, BufferError> {
        encode_struct(def, record, self)
    }

    pub fn write_object<T: Serializable>(&mut self, object: &T) -> &mut Self {
        let bytes = object.serialize();
        self.write_buffer(bytes.as_bytes())
    }

    pub fn read_object<T: Serializable>(&mut self) -> Result<T, BufferError> {
        T::deserialize(self)
    }

    // ---- whole-buffer helpers ----

    /// Replace every byte with `f(byte, index)`. Offsets are left untouched.
    pub fn map<F: FnMut(u8, usize) -> u8>(&mut self, mut f: F) -> &mut Self {
        for (i, b) in self.data.iter_mut().enumerate() {
            *b = f(*b, i);
        }
        self
    }

    /// Iterate the remaining readable bytes, advancing the read offset.
    pub fn bytes(&mut self) -> Bytes<'_> {
        Bytes { buffer: self }
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Buffer { data, endianness: Endianness::default(), read_offset: 0, write_offset: 0 }
    }
}

impl From<&[u8]> for Buffer {
    fn from(data: &[u8]) -> Self {
        Buffer::from(data.to_vec())
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer<{}>", self.data.len())
    }
}

/// Iterator returned by [`Buffer::bytes`].
pub struct Bytes<'a> {
    buffer: &'a mut Buffer,
}

impl Iterator for Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if !self.buffer.readable() {
            return None;
        }
        self.buffer.read_unsigned_byte().ok()
    }
}
