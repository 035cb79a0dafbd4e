//! Map type for SION dictionaries.
//!
//! SION map keys may be any value, not only strings. [`SionMap`] stores its
//! entries in an [`IndexMap`] keyed by a hashable surrogate of the key:
//!
//! - **Atomic keys** (bool, int, float, string, bytes, timestamp) compare by
//!   value. `Int(1)` and `Float(1.0)` are different keys; `0.0` and `-0.0` are
//!   the same key.
//! - **Composite keys** (arrays and maps), `nil` and NaN floats get a unique
//!   identity when inserted. Two structurally equal keys of this kind inserted
//!   separately are two distinct entries.
//!
//! Iteration follows insertion order, but callers should not rely on it: two
//! maps are equal when they hold the same entries in any order.
//!
//! ## Examples
//!
//! ```rust
//! use serde_sion::{SionMap, Value};
//!
//! let mut map = SionMap::new();
//! map.insert(Value::Bool(true), Value::from("Yes"));
//! map.insert(Value::Int(1), Value::from("does accept"));
//! map.insert(Value::Float(1.0), Value::from("non-String keys."));
//!
//! assert_eq!(map.len(), 3);
//! assert_eq!(map.get(&Value::Int(1)).and_then(|v| v.as_str()), Some("does accept"));
//! assert_eq!(map.get(&Value::Float(1.0)).and_then(|v| v.as_str()), Some("non-String keys."));
//! ```

use crate::Value;
use indexmap::{Equivalent, IndexMap};
use std::hash::{Hash, Hasher};

/// A dictionary of arbitrary SION values.
///
/// # Examples
///
/// ```rust
/// use serde_sion::{SionMap, Value};
///
/// let mut map = SionMap::new();
/// let key = Value::Array(vec![Value::Int(1)]);
/// map.insert(key.clone(), Value::from("first"));
/// map.insert(key, Value::from("second"));
///
/// // Composite keys are identity-keyed: both entries survive
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SionMap {
    entries: IndexMap<MapKey, Value>,
    next_identity: u64,
}

/// A map key together with the identity that decides its equality.
#[derive(Debug, Clone)]
struct MapKey {
    value: Value,
    identity: Option<u64>,
}

/// Borrowed view used to look up atomic keys without cloning them.
struct AtomicKey<'a>(&'a Value);

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.identity {
            Some(id) => {
                state.write_u8(0xff);
                id.hash(state);
            }
            None => hash_atomic(&self.value, state),
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.identity, other.identity) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.value == other.value,
            _ => false,
        }
    }
}

impl Eq for MapKey {}

impl Hash for AtomicKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_atomic(self.0, state);
    }
}

impl Equivalent<MapKey> for AtomicKey<'_> {
    fn equivalent(&self, key: &MapKey) -> bool {
        key.identity.is_none() && *self.0 == key.value
    }
}

/// Keys compared by value. `nil` keys are identity-keyed like composites, and
/// NaN never equals itself.
fn is_value_keyed(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Float(f) => !f.is_nan(),
        other => other.is_atomic(),
    }
}

fn hash_atomic<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Nil => state.write_u8(0),
        Value::Bool(b) => {
            state.write_u8(1);
            b.hash(state);
        }
        Value::Int(i) => {
            state.write_u8(2);
            i.hash(state);
        }
        Value::Float(f) => {
            state.write_u8(3);
            // 0.0 == -0.0
            let normalized = if *f == 0.0 { 0.0f64 } else { *f };
            normalized.to_bits().hash(state);
        }
        Value::String(s) => {
            state.write_u8(4);
            s.hash(state);
        }
        Value::Bytes(b) => {
            state.write_u8(5);
            b.hash(state);
        }
        Value::Timestamp(t) => {
            state.write_u8(6);
            t.hash(state);
        }
        Value::Array(_) | Value::Map(_) => state.write_u8(7),
    }
}

impl SionMap {
    /// Creates an empty `SionMap`.
    #[must_use]
    pub fn new() -> Self {
        SionMap {
            entries: IndexMap::new(),
            next_identity: 0,
        }
    }

    /// Creates an empty `SionMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        SionMap {
            entries: IndexMap::with_capacity(capacity),
            next_identity: 0,
        }
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained an equal atomic key, the old value is
    /// replaced and returned. Composite and `nil` keys always create a new entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_sion::{SionMap, Value};
    ///
    /// let mut map = SionMap::new();
    /// assert!(map.insert(Value::from("key"), Value::from(42)).is_none());
    /// assert_eq!(map.insert(Value::from("key"), Value::from(43)), Some(Value::from(42)));
    /// ```
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        let identity = if is_value_keyed(&key) {
            None
        } else {
            let id = self.next_identity;
            self.next_identity += 1;
            Some(id)
        };
        self.entries.insert(
            MapKey {
                value: key,
                identity,
            },
            value,
        )
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// Atomic keys are looked up by value. An identity-keyed key (composite or
    /// `nil`) matches the first such entry that is structurally equal to it.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        if is_value_keyed(key) {
            self.entries.get(&AtomicKey(key))
        } else {
            self.entries
                .iter()
                .find(|(k, _)| k.identity.is_some() && k.value == *key)
                .map(|(_, v)| v)
        }
    }

    /// Returns `true` if [`SionMap::get`] would find the key.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries of the map.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.keys().map(|k| &k.value)
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.values()
    }
}

/// Borrowing iterator over the entries of a [`SionMap`].
pub struct Iter<'a>(indexmap::map::Iter<'a, MapKey, Value>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (&k.value, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over the entries of a [`SionMap`].
pub struct IntoIter(indexmap::map::IntoIter<MapKey, Value>);

impl Iterator for IntoIter {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.value, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for SionMap {
    type Item = (Value, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_iter())
    }
}

impl<'a> IntoIterator for &'a SionMap {
    type Item = (&'a Value, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(Value, Value)> for SionMap {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut map = SionMap::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl PartialEq for SionMap {
    /// Order-insensitive comparison: every entry must be matched by a
    /// structurally equal entry in the other map.
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut matched = vec![false; other.len()];
        self.iter().all(|(key, value)| {
            let found = other
                .iter()
                .enumerate()
                .position(|(i, (k, v))| !matched[i] && k == key && v == value);
            match found {
                Some(i) => {
                    matched[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}
