//! # serde_sion
//!
//! A Serde-compatible serialization library for SION, a JSON-like notation with
//! a few extensions.
//!
//! ## What is SION?
//!
//! SION reads like JSON with Swift-style brackets. Arrays and dictionaries both
//! use `[` and `]`, and the presence of `:` tells them apart:
//!
//! ```text
//! [
//!     "array"      : [ nil, true, 1, 1.0, "one", [1], ["one" : 1.0] ],
//!     "dictionary" : [ "array" : [], "dictionary" : [:] ],
//!     "data"       : .Data("R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7"),
//!     "date"       : .Date(0x0p+0),   // hex, exponent dropped without a `.`
//!     "ext"        : .Date(1531314574),
//!     "double"     : 0x1.518f5c28f5c29p+5,
//!     true         : "non-string keys are fine"
//! ]
//! ```
//!
//! ## Key Features
//!
//! - **Any key type**: dictionary keys may be any value, including arrays and
//!   dictionaries
//! - **Comments**: `//` line comments wherever whitespace is allowed
//! - **Numerals**: decimal, hexadecimal, binary and octal integers plus decimal
//!   and hexadecimal floats
//! - **Extended literals**: `.Data("<base64>")` for binary payloads and
//!   `.Date(<seconds>)` for timestamps
//! - **Serde Compatible**: works with existing Rust types via
//!   `#[derive(Serialize, Deserialize)]`
//! - **Streaming input**: decodes from any [`std::io::Read`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_sion = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_sion::{to_string, from_str};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice".to_string(),
//!     active: true,
//! };
//!
//! let sion = to_string(&user).unwrap();
//! assert_eq!(sion, r#"["id":123,"name":"Alice","active":true]"#);
//!
//! let user_back: User = from_str(&sion).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_sion::{decode, Value};
//!
//! let value = decode(r#"[1: "one", 1.0: "one point oh"]"#.as_bytes()).unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get(&Value::Int(1)).and_then(Value::as_str), Some("one"));
//! assert_eq!(map.get(&Value::Float(1.0)).and_then(Value::as_str), Some("one point oh"));
//! ```
//!
//! ### Building Values with the sion! Macro
//!
//! ```rust
//! use serde_sion::{sion, Value};
//!
//! let data = sion!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"],
//!     1: nil
//! });
//!
//! assert_eq!(serde_sion::to_string(&data).unwrap(), r#"["name":"Alice","tags":["rust","serde"],1:nil]"#);
//! ```
//!
//! ## Typing Rules
//!
//! Typed decoding never coerces between numeric kinds: `1` only feeds integer
//! fields and `1.0` only feeds float fields. `.Date(...)` values feed
//! `chrono::DateTime<Utc>` fields, and `.Data(...)` values feed `Vec<u8>`.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types
//! - No panics in public API (except for logic errors that indicate bugs)
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Typed records in and out of SION
//! - **`dynamic_values.rs`** - Working with [`Value`] and non-string keys
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
mod read;
pub mod ser;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, Result};
pub use map::SionMap;
pub use options::SionOptions;
pub use ser::{Serializer, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use tracing::debug;

/// Decodes one SION document into a dynamic [`Value`].
///
/// The whole stream must hold exactly one value, optionally surrounded by
/// whitespace and comments.
///
/// # Examples
///
/// ```rust
/// use serde_sion::{decode, Value};
///
/// let value = decode("[true, [:]] // done".as_bytes()).unwrap();
/// assert_eq!(value.as_array().map(Vec::len), Some(2));
/// ```
///
/// # Errors
///
/// Returns a syntax error with line and column information when the input is
/// malformed, or an I/O error when the reader fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode<R>(reader: R) -> Result<Value>
where
    R: io::Read,
{
    let mut deserializer = Deserializer::from_reader(reader);
    let value = deserializer.decode()?;
    deserializer.end()?;
    Ok(value)
}

/// Encodes a dynamic [`Value`] to a writer.
///
/// # Errors
///
/// Returns an error if the value holds a non-finite float or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<W>(value: &Value, writer: W) -> Result<()>
where
    W: io::Write,
{
    to_writer(writer, value)
}

/// Serialize any `T: Serialize` to a SION string.
///
/// # Examples
///
/// ```rust
/// use serde_sion::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), r#"["x":1,"y":2]"#);
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized (e.g., non-finite floats).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, SionOptions::default())
}

/// Serialize any `T: Serialize` to a SION string with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: SionOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Serialize any `T: Serialize` to a byte vector of SION text.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_sion::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_map().and_then(|m| m.get(&Value::from("x"))), Some(&Value::Int(1)));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serialize any `T: Serialize` to a writer in SION format.
///
/// The text is built in memory and written with a single `write_all`.
///
/// # Examples
///
/// ```rust
/// use serde_sion::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec![1, 2]).unwrap();
/// assert_eq!(buffer, b"[1,2]");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, SionOptions::default())
}

/// Serialize any `T: Serialize` to a writer in SION format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: SionOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let sion = to_string_with_options(value, options)?;
    writer.write_all(sion.as_bytes()).map_err(|e| {
        debug!(error = %e, "writing SION output failed");
        Error::from(e)
    })
}

fn from_deserializer<R, T>(mut deserializer: Deserializer<R>) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let value = deserializer.decode()?;
    deserializer.end()?;
    T::deserialize(value)
}

/// Deserialize an instance of type `T` from a string of SION text.
///
/// # Examples
///
/// ```rust
/// use serde_sion::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str(r#"[ "x": 1, "y": 2 ]"#).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid SION or cannot be deserialized to
/// type `T`. Syntax errors include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_deserializer(Deserializer::from_str(s))
}

/// Deserialize an instance of type `T` from an I/O stream of SION.
///
/// # Examples
///
/// ```rust
/// use serde_sion::from_reader;
/// use std::io::Cursor;
///
/// let numbers: Vec<i64> = from_reader(Cursor::new(b"[1, 0x2a, 0b11]")).unwrap();
/// assert_eq!(numbers, vec![1, 42, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// SION, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    from_deserializer(Deserializer::from_reader(reader))
}

/// Deserialize an instance of type `T` from bytes of SION text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid SION, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    from_deserializer(Deserializer::from_slice(v))
}

/// Interpret a [`Value`] as an instance of type `T`.
///
/// # Examples
///
/// ```rust
/// use serde_sion::{from_value, Value};
///
/// let n: i64 = from_value(Value::Int(7)).unwrap();
/// assert_eq!(n, 7);
/// assert!(from_value::<i64>(Value::Float(7.0)).is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when the value's variant does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value)
}
