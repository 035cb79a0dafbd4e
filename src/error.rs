//! Error types for SION serialization and deserialization.
//!
//! Every decoding failure is fatal to the call that produced it: the decoder
//! never hands back a partially built value. Syntax errors carry the 1-based
//! line and column where the problem was detected.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: one variant per construct (string, nil, bool, number,
//!   empty map, array, map, `.Data`, `.Date`, unknown token, trailing content,
//!   nesting too deep)
//! - **Type Mismatches**: a typed target disagrees with the decoded variant
//! - **Stream Errors**: I/O failures, invalid UTF-8, unexpected end of input
//!
//! ## Examples
//!
//! ```rust
//! use serde_sion::{decode, Error};
//!
//! let err = decode("truee".as_bytes()).unwrap_err();
//! assert!(matches!(err, Error::Bool { .. }));
//! assert_eq!(err.position(), Some((1, 1)));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during SION serialization/deserialization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input stream is not valid UTF-8
    #[error("Invalid UTF-8 at line {line}, column {col}")]
    InvalidUtf8 { line: usize, col: usize },

    /// Input ended in the middle of a value
    #[error("Unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// Malformed or unterminated string literal
    #[error("String syntax error at line {line}, column {col}: {msg}")]
    String { line: usize, col: usize, msg: String },

    /// Letters spelling something other than `nil`
    #[error("Nil syntax error at line {line}, column {col}: expected `nil`, found `{found}`")]
    Nil {
        line: usize,
        col: usize,
        found: String,
    },

    /// Letters spelling something other than `true`/`false`
    #[error(
        "Bool syntax error at line {line}, column {col}: expected `true` or `false`, found `{found}`"
    )]
    Bool {
        line: usize,
        col: usize,
        found: String,
    },

    /// Numeral that does not parse as i64/f64
    #[error("Number syntax error at line {line}, column {col}: invalid numeral `{literal}`")]
    Number {
        line: usize,
        col: usize,
        literal: String,
    },

    /// `[:` not immediately followed by `]`
    #[error("Empty map syntax error at line {line}, column {col}: expected `]` after `[:`")]
    EmptyMap { line: usize, col: usize },

    /// Unexpected delimiter inside an array
    #[error("Array syntax error at line {line}, column {col}: expected `,` or `]`, found `{found}`")]
    Array {
        line: usize,
        col: usize,
        found: char,
    },

    /// Unexpected delimiter inside a map
    #[error("Map syntax error at line {line}, column {col}: expected {expected}, found `{found}`")]
    Map {
        line: usize,
        col: usize,
        expected: &'static str,
        found: char,
    },

    /// `.Data(` body is not valid base64 or the closing `)` is missing
    #[error("Data syntax error at line {line}, column {col}: {msg}")]
    Data { line: usize, col: usize, msg: String },

    /// `.Date(` body is not numeric or the closing `)` is missing
    #[error("Date syntax error at line {line}, column {col}: {msg}")]
    Date { line: usize, col: usize, msg: String },

    /// The lookahead character starts no known value
    #[error("Unknown token at line {line}, column {col}: `{found}`")]
    UnknownToken {
        line: usize,
        col: usize,
        found: String,
    },

    /// Non-whitespace content after the top-level value
    #[error("Trailing content at line {line}, column {col}: `{found}`")]
    TrailingContent {
        line: usize,
        col: usize,
        found: char,
    },

    /// Arrays and maps nested deeper than the decoder allows
    #[error("Recursion limit exceeded at line {line}, column {col}: nesting deeper than {limit} levels")]
    RecursionLimit {
        line: usize,
        col: usize,
        limit: usize,
    },

    /// Type mismatch during typed deserialization
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Unsupported type or value for serialization
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a type mismatch error when deserialization fails due to incompatible types.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sion::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(line: usize, col: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            line,
            col,
            expected: expected.to_string(),
        }
    }

    /// Creates an unsupported type error for values that have no SION representation.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sion::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the `(line, column)` where a decoding error was detected, if the
    /// error is tied to a position in the input.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::InvalidUtf8 { line, col }
            | Error::UnexpectedEof { line, col, .. }
            | Error::String { line, col, .. }
            | Error::Nil { line, col, .. }
            | Error::Bool { line, col, .. }
            | Error::Number { line, col, .. }
            | Error::EmptyMap { line, col }
            | Error::Array { line, col, .. }
            | Error::Map { line, col, .. }
            | Error::Data { line, col, .. }
            | Error::Date { line, col, .. }
            | Error::UnknownToken { line, col, .. }
            | Error::TrailingContent { line, col, .. }
            | Error::RecursionLimit { line, col, .. } => Some((*line, *col)),
            Error::Io(_)
            | Error::TypeMismatch { .. }
            | Error::UnsupportedType(_)
            | Error::Custom(_) => None,
        }
    }

    /// Returns `true` if the input text itself is malformed.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        !matches!(
            self,
            Error::Io(_)
                | Error::InvalidUtf8 { .. }
                | Error::UnexpectedEof { .. }
                | Error::TypeMismatch { .. }
                | Error::UnsupportedType(_)
                | Error::Custom(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
