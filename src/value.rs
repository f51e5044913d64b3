//! Runtime values produced by reads and consumed by writes.

use indexmap::IndexMap;

use crate::types::NumberType;

/// A decoded struct: field name to value, in definition order.
pub type Record = IndexMap<String, Value>;

/// A single decoded value (numeric, raw bytes, nested record, or custom reader output).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    S8(i8),
    U8(u8),
    S16(i16),
    U16(u16),
    S24(i32),
    U24(u32),
    S32(i32),
    U32(u32),
    S64(i64),
    U64(u64),
    Half(f32),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
    Struct(Record),
    List(Vec<Value>),
}

impl Value {
    /// The numeric type that produced this value, if any.
    pub fn number_type(&self) -> Option<NumberType> {
        let t = match self {
            Value::S8(_) => NumberType::S8,
            Value::U8(_) => NumberType::U8,
            Value::S16(_) => NumberType::S16,
            Value::U16(_) => NumberType::U16,
            Value::S24(_) => NumberType::S24,
            Value::U24(_) => NumberType::U24,
            Value::S32(_) => NumberType::S32,
            Value::U32(_) => NumberType::U32,
            Value::S64(_) => NumberType::S64,
            Value::U64(_) => NumberType::U64,
            Value::Half(_) => NumberType::Half,
            Value::Float(_) => NumberType::Float,
            Value::Double(_) => NumberType::Double,
            _ => return None,
        };
        Some(t)
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Struct(_) => "struct",
            Value::List(_) => "list",
            _ => self.number_type().map(NumberType::tag).unwrap_or("value"),
        }
    }

    /// Integer payload widened to `i128` (lossless for every integer variant).
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::S8(x) => Some(*x as i128),
            Value::U8(x) => Some(*x as i128),
            Value::S16(x) => Some(*x as i128),
            Value::U16(x) => Some(*x as i128),
            Value::S24(x) => Some(*x as i128),
            Value::U24(x) => Some(*x as i128),
            Value::S32(x) => Some(*x as i128),
            Value::U32(x) => Some(*x as i128),
            Value::S64(x) => Some(*x as i128),
            Value::U64(x) => Some(*x as i128),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|x| u64::try_from(x).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|x| i64::try_from(x).ok())
    }

    /// Any numeric payload as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Half(x) | Value::Float(x) => Some(*x as f64),
            Value::Double(x) => Some(*x),
            _ => self.as_i128().map(|x| x as f64),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Record> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Struct(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_accessors() {
        assert_eq!(Value::U64(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Value::U64(u64::MAX).as_i64(), None);
        assert_eq!(Value::S8(-3).as_i64(), Some(-3));
        assert_eq!(Value::S8(-3).as_u64(), None);
        assert_eq!(Value::Bytes(vec![1]).as_i128(), None);
    }

    #[test]
    fn number_type_of_values() {
        assert_eq!(Value::U24(1).number_type(), Some(NumberType::U24));
        assert_eq!(Value::Half(1.0).number_type(), Some(NumberType::Half));
        assert_eq!(Value::Text("x".into()).number_type(), None);
    }
}
