//! The [`sion!`](crate::sion) macro for building [`Value`](crate::Value) trees inline.
//!
//! Elements, keys and values must each be a single token tree. Wrap anything
//! longer, such as a negative number, in parentheses: `sion!([(-1), 2])`.

/// Builds a [`Value`](crate::Value) from SION-like syntax.
///
/// # Examples
///
/// ```rust
/// use serde_sion::{sion, Value};
///
/// let value = sion!({
///     "name": "Alice",
///     1: [true, nil, 2.5],
///     "empty": [:]
/// });
/// assert_eq!(value.as_map().map(|m| m.len()), Some(3));
/// assert_eq!(sion!([]), Value::Array(vec![]));
/// ```
#[macro_export]
macro_rules! sion {
    (nil) => {
        $crate::Value::Nil
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([:]) => {
        $crate::Value::Map($crate::SionMap::new())
    };

    ([ $($elem:tt),+ $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::sion!($elem)),+])
    };

    ({}) => {
        $crate::Value::Map($crate::SionMap::new())
    };

    ({ $($key:tt : $value:tt),+ $(,)? }) => {{
        let mut map = $crate::SionMap::new();
        $(
            map.insert($crate::sion!($key), $crate::sion!($value));
        )+
        $crate::Value::Map(map)
    }};

    // Any other expression goes through Serialize.
    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::Value::Nil)
    };
}
