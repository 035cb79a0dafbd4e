//! SION deserialization.
//!
//! This module provides the [`Deserializer`] that parses SION text into a
//! [`Value`] tree, and the Serde mapping that turns a [`Value`] into any type
//! implementing `Deserialize`.
//!
//! ## Overview
//!
//! - **Single-pass parsing**: recursive descent over a character stream with one
//!   character of lookahead and one character of pushback
//! - **Streaming input**: any [`std::io::Read`] works; `&str` and `&[u8]` are
//!   just readers
//! - **Error reporting**: every syntax error carries the line and column where
//!   it was detected
//! - **Strict typing**: integers only come from `Int`, floats only from
//!   `Float`; there is no numeric coercion
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_sion::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str(r#"["x": 1, "y": 2]"#).unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```
//!
//! The [`Deserializer`] can also be driven directly to read one dynamic value:
//!
//! ```rust
//! use serde_sion::{Deserializer, Value};
//!
//! let mut de = Deserializer::from_str("[1: \"one\"] // trailing comment");
//! let value = de.decode().unwrap();
//! de.end().unwrap();
//! assert!(value.is_map());
//! ```

use crate::read::Scanner;
use crate::value::{timestamp_from_secs, DATE_TOKEN};
use crate::{Error, Result, SionMap, SionOptions, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de;
use std::io::Read;
use tracing::{debug, trace};

/// The SION deserializer.
///
/// Reads exactly one top-level value per call to [`Deserializer::decode`].
/// Created via [`Deserializer::from_reader`], [`Deserializer::from_str`] or
/// [`Deserializer::from_slice`].
pub struct Deserializer<R> {
    scanner: Scanner<R>,
    options: SionOptions,
    depth: usize,
}

/// Deepest array/map nesting accepted before decoding fails.
const RECURSION_LIMIT: usize = 128;

impl<R: Read> Deserializer<R> {
    /// Creates a deserializer reading SION text from `reader`.
    pub fn from_reader(reader: R) -> Self {
        Deserializer {
            scanner: Scanner::new(reader),
            options: SionOptions::default(),
            depth: 0,
        }
    }

    /// Replaces the decoding options.
    #[must_use]
    pub fn with_options(mut self, options: SionOptions) -> Self {
        self.options = options;
        self
    }

    /// Decodes the next top-level value.
    ///
    /// Leading whitespace and comments are skipped. An input holding nothing
    /// but whitespace and comments is an [`Error::UnexpectedEof`].
    pub fn decode(&mut self) -> Result<Value> {
        let result = self.skip_whitespace().and_then(|()| self.parse_value());
        if let Err(ref err) = result {
            debug!(error = %err, "SION decode failed");
        }
        result
    }

    /// Checks that only whitespace and comments remain in the input.
    pub fn end(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace()?;
            let (line, col) = self.scanner.position();
            match self.scanner.next()? {
                None => return Ok(()),
                Some(ch) if ch.is_whitespace() => continue,
                Some(found) => {
                    let err = Error::TrailingContent { line, col, found };
                    debug!(error = %err, "SION decode failed");
                    return Err(err);
                }
            }
        }
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        loop {
            match self.scanner.peek()? {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.scanner.next()?;
                }
                Some('/') => {
                    self.scanner.next()?;
                    if self.scanner.peek()? == Some('/') {
                        self.scanner.skip_line()?;
                    } else {
                        self.scanner.unread('/');
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        let (line, col) = self.scanner.position();
        match self.scanner.peek()? {
            Some('[') => self.parse_array_or_map(),
            Some('-' | '0'..='9') => self.parse_number(),
            Some('"') => self.parse_string().map(Value::String),
            Some('t' | 'f') => self.parse_bool(),
            Some('n') => self.parse_nil(),
            Some('.') => self.parse_extended(),
            Some(ch) => Err(Error::UnknownToken {
                line,
                col,
                found: ch.to_string(),
            }),
            None => Err(Error::unexpected_eof(line, col, "a value")),
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let (line, col) = self.scanner.position();
        match self.scanner.next()? {
            Some('"') => {}
            Some(found) => {
                return Err(Error::String {
                    line,
                    col,
                    msg: format!("expected `\"`, found `{}`", found),
                })
            }
            None => return Err(Error::unexpected_eof(line, col, "a string")),
        }

        let unterminated = || Error::String {
            line,
            col,
            msg: "unterminated string".to_string(),
        };

        let mut result = String::new();
        loop {
            let (ch_line, ch_col) = self.scanner.position();
            let ch = match self.scanner.next()? {
                Some(ch) => ch,
                // A string cut off by end of input is accepted once it has content.
                None if result.is_empty() || self.options.strict_strings => {
                    return Err(unterminated())
                }
                None => break,
            };
            match ch {
                '"' => break,
                '\\' => match self.scanner.next()? {
                    Some('t') => result.push('\t'),
                    Some('\\') => result.push('\\'),
                    Some('b') => result.push('\u{0008}'),
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some(other) => result.push(other),
                    None => return Err(unterminated()),
                },
                c if c.is_control() => {
                    return Err(Error::String {
                        line: ch_line,
                        col: ch_col,
                        msg: format!("unescaped control character U+{:04X}", c as u32),
                    })
                }
                c => result.push(c),
            }
        }
        Ok(result)
    }

    /// Consumes the maximal run of characters accepted by `accept`.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> Result<String> {
        let mut run = String::new();
        while let Some(ch) = self.scanner.peek()? {
            if !accept(ch) {
                break;
            }
            run.push(ch);
            self.scanner.next()?;
        }
        Ok(run)
    }

    fn parse_bool(&mut self) -> Result<Value> {
        let (line, col) = self.scanner.position();
        let word = self.take_while(char::is_alphabetic)?;
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::Bool {
                line,
                col,
                found: word,
            }),
        }
    }

    fn parse_nil(&mut self) -> Result<Value> {
        let (line, col) = self.scanner.position();
        let word = self.take_while(|ch| matches!(ch, 'n' | 'i' | 'l'))?;
        if word == "nil" {
            Ok(Value::Nil)
        } else {
            Err(Error::Nil {
                line,
                col,
                found: word,
            })
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let (line, col) = self.scanner.position();
        let literal = self.take_while(|ch| {
            matches!(ch, '0'..='9' | 'a'..='f' | '-' | '.' | 'x' | '+' | 'p')
        })?;
        parse_numeral(&literal).ok_or(Error::Number { line, col, literal })
    }

    fn parse_extended(&mut self) -> Result<Value> {
        let (line, col) = self.scanner.position();
        let mut token = String::new();
        loop {
            match self.scanner.next()? {
                Some(ch) => {
                    token.push(ch);
                    if ch == '(' {
                        break;
                    }
                }
                None => {
                    let (eof_line, eof_col) = self.scanner.position();
                    return Err(Error::unexpected_eof(
                        eof_line,
                        eof_col,
                        "`(` after `.Data` or `.Date`",
                    ));
                }
            }
        }

        match token.as_str() {
            ".Data(" => self.parse_data(line, col),
            ".Date(" => self.parse_date(line, col),
            _ => Err(Error::UnknownToken {
                line,
                col,
                found: token,
            }),
        }
    }

    fn parse_data(&mut self, line: usize, col: usize) -> Result<Value> {
        self.skip_whitespace()?;
        let encoded = self.parse_string()?;
        let bytes = STANDARD.decode(encoded.as_bytes()).map_err(|e| Error::Data {
            line,
            col,
            msg: format!("invalid base64: {}", e),
        })?;
        self.close_extended(|line, col, msg| Error::Data { line, col, msg })?;
        trace!(len = bytes.len(), "decoded .Data literal");
        Ok(Value::Bytes(bytes))
    }

    fn parse_date(&mut self, line: usize, col: usize) -> Result<Value> {
        self.skip_whitespace()?;
        let (body_line, body_col) = self.scanner.position();
        let secs = match self.scanner.peek()? {
            Some('-' | '0'..='9') => {
                let number = self.parse_number().map_err(|err| match err {
                    Error::Number { literal, .. } => Error::Date {
                        line: body_line,
                        col: body_col,
                        msg: format!("invalid seconds `{}`", literal),
                    },
                    other => other,
                })?;
                // Fractional seconds truncate toward zero.
                number
                    .as_i64()
                    .or_else(|| number.as_f64().map(|f| f as i64))
                    .unwrap_or_default()
            }
            Some(found) => {
                return Err(Error::Date {
                    line: body_line,
                    col: body_col,
                    msg: format!("expected seconds, found `{}`", found),
                })
            }
            None => return Err(Error::unexpected_eof(body_line, body_col, "seconds")),
        };
        let timestamp = timestamp_from_secs(secs).ok_or_else(|| Error::Date {
            line,
            col,
            msg: format!("timestamp out of range: {}", secs),
        })?;
        self.close_extended(|line, col, msg| Error::Date { line, col, msg })?;
        trace!(secs, "decoded .Date literal");
        Ok(Value::Timestamp(timestamp))
    }

    fn close_extended(&mut self, make_error: fn(usize, usize, String) -> Error) -> Result<()> {
        self.skip_whitespace()?;
        let (line, col) = self.scanner.position();
        match self.scanner.next()? {
            Some(')') => Ok(()),
            Some(found) => Err(make_error(
                line,
                col,
                format!("expected `)`, found `{}`", found),
            )),
            None => Err(Error::unexpected_eof(line, col, "`)`")),
        }
    }

    fn parse_array_or_map(&mut self) -> Result<Value> {
        if self.depth == RECURSION_LIMIT {
            let (line, col) = self.scanner.position();
            return Err(Error::RecursionLimit {
                line,
                col,
                limit: RECURSION_LIMIT,
            });
        }
        self.depth += 1;
        let result = self.parse_container();
        self.depth -= 1;
        result
    }

    fn parse_container(&mut self) -> Result<Value> {
        self.scanner.next()?; // consume '['
        self.skip_whitespace()?;

        match self.scanner.peek()? {
            Some(':') => {
                self.scanner.next()?;
                self.skip_whitespace()?;
                let (line, col) = self.scanner.position();
                return match self.scanner.next()? {
                    Some(']') => Ok(Value::Map(SionMap::new())),
                    Some(_) => Err(Error::EmptyMap { line, col }),
                    None => Err(Error::unexpected_eof(line, col, "`]`")),
                };
            }
            Some(']') => {
                self.scanner.next()?;
                return Ok(Value::Array(Vec::new()));
            }
            _ => {}
        }

        let first = self.parse_value()?;
        self.skip_whitespace()?;
        let (line, col) = self.scanner.position();
        match self.scanner.next()? {
            Some(']') => Ok(Value::Array(vec![first])),
            Some(',') => self.parse_array_rest(first),
            Some(':') => self.parse_map_rest(first),
            Some(found) => Err(Error::Array { line, col, found }),
            None => Err(Error::unexpected_eof(line, col, "`,`, `:` or `]`")),
        }
    }

    fn parse_array_rest(&mut self, first: Value) -> Result<Value> {
        let mut elements = vec![first];
        loop {
            self.skip_whitespace()?;
            elements.push(self.parse_value()?);
            self.skip_whitespace()?;
            let (line, col) = self.scanner.position();
            match self.scanner.next()? {
                Some(']') => return Ok(Value::Array(elements)),
                Some(',') => {}
                Some(found) => return Err(Error::Array { line, col, found }),
                None => return Err(Error::unexpected_eof(line, col, "`,` or `]`")),
            }
        }
    }

    fn parse_map_rest(&mut self, first_key: Value) -> Result<Value> {
        let mut map = SionMap::new();
        self.skip_whitespace()?;
        let first_value = self.parse_value()?;
        map.insert(first_key, first_value);

        loop {
            self.skip_whitespace()?;
            let (line, col) = self.scanner.position();
            match self.scanner.next()? {
                Some(']') => return Ok(Value::Map(map)),
                Some(',') => {}
                Some(found) => {
                    return Err(Error::Map {
                        line,
                        col,
                        expected: "`,` or `]`",
                        found,
                    })
                }
                None => return Err(Error::unexpected_eof(line, col, "`,` or `]`")),
            }

            self.skip_whitespace()?;
            let key = self.parse_value()?;
            self.skip_whitespace()?;
            let (line, col) = self.scanner.position();
            match self.scanner.next()? {
                Some(':') => {}
                Some(found) => {
                    return Err(Error::Map {
                        line,
                        col,
                        expected: "`:`",
                        found,
                    })
                }
                None => return Err(Error::unexpected_eof(line, col, "`:`")),
            }

            self.skip_whitespace()?;
            let value = self.parse_value()?;
            map.insert(key, value);
        }
    }
}

impl<'a> Deserializer<&'a [u8]> {
    /// Creates a deserializer over SION text held in a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Deserializer::from_reader(input.as_bytes())
    }

    /// Creates a deserializer over SION text held in a byte slice.
    pub fn from_slice(input: &'a [u8]) -> Self {
        Deserializer::from_reader(input)
    }
}

/// Interprets a scanned numeral.
///
/// A numeral containing `.` is a float. Anything else is an integer in
/// decimal, `0x` hexadecimal, `0b` binary or leading-`0` octal notation.
/// Returns `None` unless the whole run parses.
fn parse_numeral(literal: &str) -> Option<Value> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let hex = digits.strip_prefix("0x");

    if digits.contains('.') {
        let magnitude = match hex {
            Some(body) => parse_hex_float(body)?,
            None => parse_decimal_float(digits)?,
        };
        return Some(Value::Float(if negative { -magnitude } else { magnitude }));
    }

    let (radix, body) = if let Some(body) = hex {
        // Without a `.` the binary exponent is read and dropped: `0x1p+5` is 1.
        let body = match body.split_once('p') {
            Some((mantissa, exponent)) => {
                exponent.parse::<i64>().ok()?;
                mantissa
            }
            None => body,
        };
        (16, body)
    } else if let Some(body) = digits.strip_prefix("0b") {
        (2, body)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }
    // Parsing with the sign attached keeps i64::MIN representable.
    let signed = if negative {
        format!("-{}", body)
    } else {
        body.to_string()
    };
    i64::from_str_radix(&signed, radix).ok().map(Value::Int)
}

fn parse_decimal_float(digits: &str) -> Option<f64> {
    if !digits.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// Parses the part of a hexadecimal float after `0x`, e.g. `1.8p+1`.
fn parse_hex_float(body: &str) -> Option<f64> {
    let (mantissa, exponent) = body.split_once('p')?;
    let exponent: i64 = exponent.parse().ok()?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut bits: u128 = 0;
    let mut scale = exponent;
    for (i, ch) in int_part.chars().chain(frac_part.chars()).enumerate() {
        let digit = ch.to_digit(16)?;
        let fractional = i >= int_part.len();
        if bits >> 124 == 0 {
            bits = (bits << 4) | u128::from(digit);
            if fractional {
                scale -= 4;
            }
        } else if !fractional {
            scale += 4;
        }
    }
    Some(ldexp(bits as f64, scale))
}

/// Computes `x * 2^exp`.
fn ldexp(mut x: f64, mut exp: i64) -> f64 {
    while exp != 0 && x != 0.0 && x.is_finite() {
        let step = exp.clamp(-1000, 1000);
        x *= 2f64.powi(step as i32);
        exp -= step;
    }
    x
}

macro_rules! forward_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                self.decode()?.$method(visitor)
            }
        )*
    };
}

impl<'de, R: Read> de::Deserializer<'de> for &mut Deserializer<R> {
    type Error = Error;

    forward_to_value! {
        deserialize_any deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_option deserialize_unit
        deserialize_seq deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_unit_struct(name, visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_tuple(len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_tuple_struct(name, len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_struct(name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.decode()?.deserialize_enum(name, variants, visitor)
    }
}

impl Value {
    fn invalid_type(&self, expected: &str) -> Error {
        Error::type_mismatch(expected, self.kind())
    }
}

fn visit_array<'de, V>(array: Vec<Value>, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    let len = array.len();
    let mut seq = SeqDeserializer::new(array);
    let value = visitor.visit_seq(&mut seq)?;
    if seq.iter.len() == 0 {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer elements in array"))
    }
}

fn visit_map<'de, V>(map: SionMap, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    visitor.visit_map(MapDeserializer::new(map))
}

macro_rules! deserialize_int {
    ($($method:ident => $visit:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match self {
                    Value::Int(i) => visitor.$visit(i),
                    other => Err(other.invalid_type("int")),
                }
            }
        )*
    };
}

/// Maps a decoded value onto any `Deserialize` type.
///
/// Scalars must match exactly: integer targets need `Int`, float targets need
/// `Float`, string targets need `String` and booleans need `Bool`. A
/// `Timestamp` also feeds string targets as RFC 3339 text, which is what
/// `chrono::DateTime<Utc>` expects. `deserialize_any` hands it out the same
/// way, so buffered targets such as tagged enums see a string too.
impl<'de> de::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Nil => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            Value::Timestamp(t) => visitor.visit_string(t.to_rfc3339()),
            Value::Array(arr) => visit_array(arr, visitor),
            Value::Map(map) => visit_map(map, visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Bool(b) => visitor.visit_bool(b),
            other => Err(other.invalid_type("bool")),
        }
    }

    deserialize_int! {
        deserialize_i8 => visit_i64
        deserialize_i16 => visit_i64
        deserialize_i32 => visit_i64
        deserialize_i64 => visit_i64
        deserialize_i128 => visit_i64
        deserialize_u8 => visit_i64
        deserialize_u16 => visit_i64
        deserialize_u32 => visit_i64
        deserialize_u64 => visit_i64
        deserialize_u128 => visit_i64
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Float(f) => visitor.visit_f64(f),
            other => Err(other.invalid_type("float")),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_string(s),
            Value::Timestamp(t) => visitor.visit_string(t.to_rfc3339()),
            other => Err(other.invalid_type("string")),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Bytes(b) => visitor.visit_byte_buf(b),
            Value::Array(arr) => visit_array(arr, visitor),
            other => Err(other.invalid_type("bytes")),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Nil => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Nil => visitor.visit_unit(),
            other => Err(other.invalid_type("nil")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if name != DATE_TOKEN {
            return visitor.visit_newtype_struct(self);
        }
        match self {
            Value::Timestamp(t) => {
                let mut marker = SionMap::with_capacity(1);
                marker.insert(Value::from(DATE_TOKEN), Value::Int(t.timestamp()));
                visit_map(marker, visitor)
            }
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Array(arr) => visit_array(arr, visitor),
            Value::Bytes(b) => visit_array(b.into_iter().map(Value::from).collect(), visitor),
            other => Err(other.invalid_type("array")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Map(map) => visit_map(map, visitor),
            other => Err(other.invalid_type("map")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::Map(map) => visit_map(map, visitor),
            Value::Array(arr) => visit_array(arr, visitor),
            other => Err(other.invalid_type("map")),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant: Value::String(variant),
                value: None,
            }),
            Value::Map(map) if map.len() == 1 => match map.into_iter().next() {
                Some((variant, value)) => visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                }),
                None => Err(Error::type_mismatch("enum", "map")),
            },
            other => Err(other.invalid_type("enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_string(s),
            other => other.deserialize_any(visitor),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        drop(self);
        visitor.visit_unit()
    }
}

impl<'de> de::IntoDeserializer<'de, Error> for Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: crate::map::IntoIter,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: SionMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: Value,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant)?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Nil) | None => Ok(()),
            Some(other) => Err(other.invalid_type("unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(Error::type_mismatch("newtype variant", "unit variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(arr)) => visit_array(arr, visitor),
            Some(other) => Err(other.invalid_type("tuple variant")),
            None => Err(Error::type_mismatch("tuple variant", "unit variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Map(map)) => visit_map(map, visitor),
            Some(Value::Array(arr)) => visit_array(arr, visitor),
            Some(other) => Err(other.invalid_type("struct variant")),
            None => Err(Error::type_mismatch("struct variant", "unit variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn decode(input: &str) -> Result<Value> {
        let mut de = Deserializer::from_str(input);
        let value = de.decode()?;
        de.end()?;
        Ok(value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode("\"foo\"").unwrap(), Value::from("foo"));
        assert_eq!(decode("314.3").unwrap(), Value::Float(314.3));
        assert_eq!(decode("-314.3").unwrap(), Value::Float(-314.3));
        assert_eq!(decode("true").unwrap(), Value::Bool(true));
        assert_eq!(decode("false").unwrap(), Value::Bool(false));
        assert_eq!(decode("nil").unwrap(), Value::Nil);
        assert_eq!(decode("42").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_integer_radixes() {
        assert_eq!(decode("-0x2a").unwrap(), Value::Int(-42));
        assert!(matches!(decode("0x2A"), Err(Error::TrailingContent { found: 'A', .. })));
        assert_eq!(decode("0b101").unwrap(), Value::Int(5));
        assert_eq!(decode("017").unwrap(), Value::Int(15));
        assert_eq!(decode("0").unwrap(), Value::Int(0));
        assert_eq!(
            decode("-9223372036854775808").unwrap(),
            Value::Int(i64::MIN)
        );
        assert!(matches!(
            decode("9223372036854775808"),
            Err(Error::Number { .. })
        ));
    }

    #[test]
    fn test_hex_floats() {
        assert_eq!(decode("0x1.518f5c28f5c29p+5").unwrap(), Value::Float(42.195));
        assert_eq!(decode("-0x1.8p1").unwrap(), Value::Float(-3.0));
        assert_eq!(decode("0x1.0p-2").unwrap(), Value::Float(0.25));
        assert!(matches!(decode("0x1.8"), Err(Error::Number { .. })));
    }

    #[test]
    fn test_hex_exponent_without_dot_is_int() {
        assert_eq!(decode("0x0p+0").unwrap(), Value::Int(0));
        assert_eq!(decode("0x1p+5").unwrap(), Value::Int(1));
        assert_eq!(decode("-0x2ap-1").unwrap(), Value::Int(-42));
        assert!(matches!(decode("0x1p"), Err(Error::Number { .. })));
        assert!(matches!(decode("0xp+1"), Err(Error::Number { .. })));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["1e5", "1.2.3", "--1", "-", "1-2", "0b102", "08"] {
            let err = decode(input).unwrap_err();
            assert!(matches!(err, Error::Number { line: 1, col: 1, .. }), "{}", input);
        }
        assert_eq!(decode("1.5e3").unwrap(), Value::Float(1500.0));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            decode(r#""a\tb\\c\bd\ne\rf\"g\qh""#).unwrap(),
            Value::from("a\tb\\c\u{0008}d\ne\rf\"gqh")
        );
        assert_eq!(decode("\"漢字😇\"").unwrap(), Value::from("漢字😇"));
    }

    #[test]
    fn test_control_character_in_string() {
        let err = decode("\"a\u{0001}b\"").unwrap_err();
        assert!(matches!(err, Error::String { line: 1, col: 3, .. }));
    }

    #[test]
    fn test_lenient_string_eof() {
        assert_eq!(decode("\"abc").unwrap(), Value::from("abc"));
        assert!(matches!(decode("\""), Err(Error::String { .. })));

        let mut de = Deserializer::from_str("\"abc")
            .with_options(SionOptions::new().with_strict_strings(true));
        assert!(matches!(de.decode(), Err(Error::String { .. })));
    }

    #[test]
    fn test_bool_and_nil_errors() {
        let err = decode("truee").unwrap_err();
        assert!(matches!(err, Error::Bool { ref found, .. } if found == "truee"));
        assert_eq!(err.position(), Some((1, 1)));

        assert!(matches!(decode("nill"), Err(Error::Nil { .. })));
        assert!(matches!(decode("[1, nl]"), Err(Error::Nil { line: 1, col: 5, .. })));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(decode("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(
            decode("[true, 1]").unwrap(),
            Value::Array(vec![Value::Bool(true), Value::Int(1)])
        );
        assert_eq!(
            decode("[ 1 ,\n 2 , 3 ]").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
    }

    #[test]
    fn test_maps() {
        assert_eq!(decode("[:]").unwrap(), Value::Map(SionMap::new()));
        assert_eq!(decode("[ : ]").unwrap(), Value::Map(SionMap::new()));

        let value = decode(r#"[true, [1: "foo"]]"#).unwrap();
        let mut inner = SionMap::new();
        inner.insert(Value::Int(1), Value::from("foo"));
        assert_eq!(
            value,
            Value::Array(vec![Value::Bool(true), Value::Map(inner)])
        );

        assert_eq!(
            decode("[true, [:]]").unwrap(),
            Value::Array(vec![Value::Bool(true), Value::Map(SionMap::new())])
        );
    }

    #[test]
    fn test_mixed_keys() {
        let value = decode(r#"[true: "Yes", 1: "does accept", 1.0: "non-String keys."]"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::Bool(true)), Some(&Value::from("Yes")));
        assert_eq!(map.get(&Value::Int(1)), Some(&Value::from("does accept")));
        assert_eq!(
            map.get(&Value::Float(1.0)),
            Some(&Value::from("non-String keys."))
        );
    }

    #[test]
    fn test_duplicate_atomic_key_keeps_last_value() {
        let value = decode(r#"["a": 1, "a": 2]"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::from("a")), Some(&Value::Int(2)));
    }

    #[test]
    fn test_composite_keys_stay_distinct() {
        let value = decode("[[1]: \"a\", [1]: \"b\"]").unwrap();
        assert_eq!(value.as_map().unwrap().len(), 2);
    }

    #[test]
    fn test_comments() {
        let input = "// leading\n[ // after bracket\n  1, // one\n  2 // two\n] // done";
        assert_eq!(
            decode(input).unwrap(),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_lone_slash_is_not_whitespace() {
        assert!(matches!(
            decode("[1, /2]"),
            Err(Error::UnknownToken { line: 1, col: 5, ref found }) if found == "/"
        ));
    }

    #[test]
    fn test_data_literal() {
        let value = decode(r#".Data("R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7")"#)
            .unwrap();
        let bytes = value.as_bytes().unwrap();
        assert_eq!(bytes.len(), 42);
        assert_eq!(&bytes[..6], b"GIF89a");

        assert_eq!(decode(".Data( \"\" )").unwrap(), Value::Bytes(vec![]));
        assert!(matches!(decode(r#".Data("!!")"#), Err(Error::Data { .. })));
        assert!(matches!(decode(r#".Data("R0lG""#), Err(Error::Data { .. } | Error::UnexpectedEof { .. })));
        assert!(matches!(decode(r#".Data("R0lG"]"#), Err(Error::Data { .. })));
        assert!(matches!(decode(".Data(1)"), Err(Error::String { .. })));
    }

    #[test]
    fn test_date_literal() {
        let value = decode(".Date(0)").unwrap();
        assert_eq!(value.as_timestamp().map(|t| t.timestamp()), Some(0));

        let value = decode(".Date(1531314574.9)").unwrap();
        assert_eq!(value.as_timestamp().map(|t| t.timestamp()), Some(1531314574));

        let value = decode(".Date(0x0p+0)").unwrap();
        assert_eq!(value.as_timestamp().map(|t| t.timestamp()), Some(0));

        assert!(matches!(decode(".Date(\"0\")"), Err(Error::Date { .. })));
        assert!(matches!(
            decode(".Date(1x)"),
            Err(Error::Date { line: 1, col: 7, ref msg }) if msg.contains("1x")
        ));
        assert!(matches!(
            decode(".Date( -)"),
            Err(Error::Date { line: 1, col: 8, .. })
        ));
        assert!(matches!(decode(".Date(0]"), Err(Error::Date { .. })));
        assert!(matches!(
            decode(".Date(9223372036854775807)"),
            Err(Error::Date { .. })
        ));
    }

    #[test]
    fn test_unknown_extended_literal() {
        assert!(matches!(
            decode(".Time(0)"),
            Err(Error::UnknownToken { ref found, .. }) if found == ".Time("
        ));
        assert!(matches!(decode(".Data"), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            decode("[1, 2"),
            Err(Error::UnexpectedEof { .. })
        ));
        assert!(matches!(
            decode("[1 2]"),
            Err(Error::Array { line: 1, col: 4, found: '2' })
        ));
        assert!(matches!(
            decode("[1, 2 3]"),
            Err(Error::Array { found: '3', .. })
        ));
        assert!(matches!(
            decode("[1: 2 3]"),
            Err(Error::Map { found: '3', .. })
        ));
        assert!(matches!(
            decode("[1: 2, 3 4]"),
            Err(Error::Map { expected: "`:`", found: '4', .. })
        ));
        assert!(matches!(
            decode("[: 1]"),
            Err(Error::EmptyMap { line: 1, col: 4 })
        ));
        assert!(matches!(
            decode("@"),
            Err(Error::UnknownToken { line: 1, col: 1, .. })
        ));
    }

    #[test]
    fn test_trailing_content() {
        assert!(decode("1 \n\t \u{3000}").is_ok());
        assert!(matches!(
            decode("1 2"),
            Err(Error::TrailingContent { line: 1, col: 3, found: '2' })
        ));
        assert!(matches!(
            decode("[]\n]"),
            Err(Error::TrailingContent { line: 2, col: 1, found: ']' })
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = format!("{}{}", "[".repeat(128), "]".repeat(128));
        assert!(decode(&nested).is_ok());

        let err = decode(&"[".repeat(129)).unwrap_err();
        assert_eq!(
            err,
            Error::RecursionLimit {
                line: 1,
                col: 129,
                limit: 128
            }
        );
        assert!(err.is_syntax());

        assert!(matches!(
            decode(&"[".repeat(200_000)),
            Err(Error::RecursionLimit { col: 129, .. })
        ));
        assert!(matches!(
            decode(&"[1: ".repeat(200_000)),
            Err(Error::RecursionLimit { .. })
        ));
    }

    #[test]
    fn test_depth_resets_between_siblings() {
        let deep = format!("{}1{}", "[".repeat(127), "]".repeat(127));
        let input = format!("[{}, {}, [\"k\": {}]]", deep, deep, deep);
        // The outer array plus the keyed map push the last branch past the limit.
        assert!(matches!(decode(&input), Err(Error::RecursionLimit { .. })));

        let shallow = format!("{}1{}", "[".repeat(126), "]".repeat(126));
        let input = format!("[{}, {}, [\"k\": {}]]", shallow, shallow, shallow);
        assert!(decode(&input).is_ok());
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(decode(""), Err(Error::UnexpectedEof { .. })));
        assert!(matches!(
            decode("  // only a comment\n"),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_error_position_on_later_line() {
        let err = decode("[\n  1,\n  truex\n]").unwrap_err();
        assert_eq!(err.position(), Some((3, 3)));
    }

    #[test]
    fn test_strict_scalar_mapping() {
        let err = i64::deserialize(Value::Float(1.0)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("int", "float"));

        let err = f64::deserialize(Value::Int(1)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("float", "int"));

        let err = String::deserialize(Value::Bool(true)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("string", "bool"));

        assert!(u8::deserialize(Value::Int(300)).is_err());
        assert_eq!(u8::deserialize(Value::Int(200)).unwrap(), 200);
    }

    #[test]
    fn test_bytes_feed_sequences() {
        let bytes = Vec::<u8>::deserialize(Value::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_deserialize_through_reader() {
        let mut de = Deserializer::from_reader(std::io::Cursor::new(b"[1, 2, 3]".to_vec()));
        let numbers: Vec<i32> = Vec::deserialize(&mut de).unwrap();
        de.end().unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
