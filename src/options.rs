//! Configuration options for SION encoding and decoding.
//!
//! ## Examples
//!
//! ```rust
//! use serde_sion::{to_string_with_options, SionOptions, Value};
//!
//! let blob = Value::Bytes(vec![0x47, 0x49, 0x46]);
//!
//! // Default: binary payloads round-trip as `.Data(...)` literals
//! assert_eq!(serde_sion::to_string(&blob).unwrap(), r#".Data("R0lG")"#);
//!
//! // Plain strings instead of extended literals
//! let options = SionOptions::new().with_extended_literals(false);
//! assert_eq!(to_string_with_options(&blob, options).unwrap(), r#""R0lG""#);
//! ```

/// Configuration options for SION encoding and decoding.
///
/// # Examples
///
/// ```rust
/// use serde_sion::SionOptions;
///
/// let options = SionOptions::new();
/// assert!(options.extended_literals);
/// assert!(!options.strict_strings);
///
/// let options = SionOptions::new().with_strict_strings(true);
/// assert!(options.strict_strings);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SionOptions {
    /// Encode `Bytes` as `.Data("...")` and `Timestamp` as `.Date(...)`.
    ///
    /// When `false`, bytes are written as a quoted base64 string and timestamps
    /// as a quoted RFC 3339 string. Neither decodes back to its original variant.
    pub extended_literals: bool,
    /// Reject strings that run into end of input without a closing quote.
    pub strict_strings: bool,
}

impl Default for SionOptions {
    fn default() -> Self {
        SionOptions {
            extended_literals: true,
            strict_strings: false,
        }
    }
}

impl SionOptions {
    /// Creates default options (extended literals on, lenient string EOF).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether bytes and timestamps are written as extended literals.
    #[must_use]
    pub fn with_extended_literals(mut self, enabled: bool) -> Self {
        self.extended_literals = enabled;
        self
    }

    /// Sets whether an unterminated string at end of input is an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sion::{Deserializer, SionOptions};
    ///
    /// let lenient = Deserializer::from_str(r#""abc"#).decode();
    /// assert!(lenient.is_ok());
    ///
    /// let strict = Deserializer::from_str(r#""abc"#)
    ///     .with_options(SionOptions::new().with_strict_strings(true))
    ///     .decode();
    /// assert!(strict.is_err());
    /// ```
    #[must_use]
    pub fn with_strict_strings(mut self, enabled: bool) -> Self {
        self.strict_strings = enabled;
        self
    }
}
