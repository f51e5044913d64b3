//! # structbuf — typed binary buffer and declarative struct codec
//!
//! A [`Buffer`] owns a byte region with independent read and write cursors and a
//! mutable byte order. It reads and writes fixed-width numbers, raw byte ranges and
//! homogeneous arrays; [`decode_struct`] / [`encode_struct`] interpret a field layout
//! (a [`ReadDefinition`] or [`WriteDefinition`]) against it.
//!
//! ## Numeric types
//!
//! - Integers: `s8`, `u8`, `s16`, `u16`, `s24`, `u24`, `s32`, `u32`, `s64`, `u64`
//! - Floating point: `half` (binary16), `float`, `double`
//!
//! Writes clamp out-of-range values to the type's bounds and never fail; reads past the
//! end of the buffer fail with [`BufferError::OutOfBounds`]. Writes past the end grow
//! the buffer.
//!
//! ## Struct definitions
//!
//! Fields are numeric types, fixed-size byte blobs (`n` bytes), nested definitions, or
//! (decode only) custom reader closures. Definitions can also be written as text:
//!
//! ```text
//! header: {
//!     id: u32;
//!     flag: u8;
//! }
//! payload: 4;
//! ```
//!
//! ## Usage
//!
//! ```
//! use structbuf::{Buffer, ReadDefinition, Value};
//!
//! let mut buf = Buffer::new(10);
//! buf.write_unsigned_long(200000000000000).write_unsigned_short(10000);
//!
//! let def = ReadDefinition::new().custom("a", |b| Ok(Value::Text(b.read_unsigned_long()?.to_string())));
//! let rec = buf.read_struct(&def).unwrap();
//! assert_eq!(rec["a"], Value::Text("200000000000000".into()));
//! ```

pub mod buffer;
pub mod dump;
pub mod half;
pub mod parser;
pub mod structs;
pub mod types;
pub mod value;

pub use buffer::{Buffer, BufferError, Serializable};
pub use parser::{load_definition, parse_definition};
pub use structs::{decode_struct, encode_struct, CustomReader, ReadDefinition, ReadField, WriteDefinition, WriteField};
pub use types::{Endianness, NumberType};
pub use value::{Record, Value};
