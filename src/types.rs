//! Binary numeric types: tags, widths and legal ranges.

use std::fmt;
use std::str::FromStr;

use crate::buffer::BufferError;

/// Byte order used for every multi-byte access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Storage class of a [`NumberType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    Signed,
    Unsigned,
    Float,
}

/// Closed set of fixed-width numeric encodings a [`Buffer`](crate::Buffer) can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberType {
    S8,
    U8,
    S16,
    U16,
    /// 24-bit signed, computed in 32 bits and stored in 3 bytes.
    S24,
    /// 24-bit unsigned, computed in 32 bits and stored in 3 bytes.
    U24,
    S32,
    U32,
    S64,
    U64,
    /// IEEE 754 binary16.
    Half,
    /// IEEE 754 binary32.
    Float,
    /// IEEE 754 binary64.
    Double,
}

pub const MIN_S24: i32 = -0x80_0000;
pub const MAX_S24: i32 = 0x7f_ffff;
pub const MAX_U24: u32 = 0xff_ffff;
/// Largest finite binary16 value.
pub const MAX_HALF: f64 = 65504.0;

impl NumberType {
    pub const ALL: [NumberType; 13] = [
        NumberType::S8,
        NumberType::U8,
        NumberType::S16,
        NumberType::U16,
        NumberType::S24,
        NumberType::U24,
        NumberType::S32,
        NumberType::U32,
        NumberType::S64,
        NumberType::U64,
        NumberType::Half,
        NumberType::Float,
        NumberType::Double,
    ];

    /// Number of bytes one value occupies in the buffer.
    pub const fn width(self) -> usize {
        match self {
            NumberType::S8 | NumberType::U8 => 1,
            NumberType::S16 | NumberType::U16 | NumberType::Half => 2,
            NumberType::S24 | NumberType::U24 => 3,
            NumberType::S32 | NumberType::U32 | NumberType::Float => 4,
            NumberType::S64 | NumberType::U64 | NumberType::Double => 8,
        }
    }

    pub const fn class(self) -> NumberClass {
        match self {
            NumberType::S8
            | NumberType::S16
            | NumberType::S24
            | NumberType::S32
            | NumberType::S64 => NumberClass::Signed,
            NumberType::U8
            | NumberType::U16
            | NumberType::U24
            | NumberType::U32
            | NumberType::U64 => NumberClass::Unsigned,
            NumberType::Half | NumberType::Float | NumberType::Double => NumberClass::Float,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self.class(), NumberClass::Float)
    }

    /// Inclusive integer range, `None` for floating point types.
    pub const fn int_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            NumberType::S8 => (i8::MIN as i128, i8::MAX as i128),
            NumberType::U8 => (0, u8::MAX as i128),
            NumberType::S16 => (i16::MIN as i128, i16::MAX as i128),
            NumberType::U16 => (0, u16::MAX as i128),
            NumberType::S24 => (MIN_S24 as i128, MAX_S24 as i128),
            NumberType::U24 => (0, MAX_U24 as i128),
            NumberType::S32 => (i32::MIN as i128, i32::MAX as i128),
            NumberType::U32 => (0, u32::MAX as i128),
            NumberType::S64 => (i64::MIN as i128, i64::MAX as i128),
            NumberType::U64 => (0, u64::MAX as i128),
            NumberType::Half | NumberType::Float | NumberType::Double => return None,
        };
        Some(bounds)
    }

    /// Largest finite magnitude for floating point types, `None` for integers.
    pub fn float_max(self) -> Option<f64> {
        match self {
            NumberType::Half => Some(MAX_HALF),
            NumberType::Float => Some(f32::MAX as f64),
            NumberType::Double => Some(f64::MAX),
            _ => None,
        }
    }

    /// Clamp an integer into this type's range. Float types pass the value through.
    pub fn clamp_int(self, value: i128) -> i128 {
        match self.int_bounds() {
            Some((min, max)) => value.clamp(min, max),
            None => value,
        }
    }

    /// Clamp a finite float into this type's representable range. NaN and infinities pass through.
    pub fn clamp_float(self, value: f64) -> f64 {
        match self.float_max() {
            Some(max) if value.is_finite() => value.clamp(-max, max),
            _ => value,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            NumberType::S8 => "s8",
            NumberType::U8 => "u8",
            NumberType::S16 => "s16",
            NumberType::U16 => "u16",
            NumberType::S24 => "s24",
            NumberType::U24 => "u24",
            NumberType::S32 => "s32",
            NumberType::U32 => "u32",
            NumberType::S64 => "s64",
            NumberType::U64 => "u64",
            NumberType::Half => "half",
            NumberType::Float => "float",
            NumberType::Double => "double",
        }
    }

    /// Parse a type tag (`"u32"`, `"half"`, ...). Unknown tags are an error.
    pub fn parse(tag: &str) -> Result<NumberType, BufferError> {
        tag.parse()
    }
}

impl FromStr for NumberType {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumberType::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == s)
            .ok_or_else(|| BufferError::UnknownType(s.to_string()))
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
