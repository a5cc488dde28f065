//! The ordered result mapping returned by a parse.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::Value;

/// Option values keyed by schema key, in schema order.
///
/// Every parse starts from a fresh copy of the defaults, so values returned
/// from one call are never affected by another.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::{OptionValues, Value};
///
/// let mut values = OptionValues::new();
/// values.set("int", Value::from(12));
/// values.set("bool", Value::from(true));
/// values.set("int", Value::from(11));
///
/// assert_eq!(values.get_i64("int"), Some(11));
/// assert_eq!(values.keys().collect::<Vec<_>>(), vec!["int", "bool"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionValues {
    entries: Vec<(String, Value)>,
}

impl OptionValues {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, keeping the position of an existing key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Looks up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Looks up a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Looks up an integer value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Looks up a numeric value as `f64`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Looks up a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns `true` if `key` has a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for OptionValues {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.set(key, value);
        }
        values
    }
}

impl IntoIterator for OptionValues {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for OptionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_ordered_map() {
        let values: OptionValues = [
            ("zeta", Value::from(1)),
            ("alpha", Value::from("a")),
            ("list", Value::from(vec![1, 2])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"{"zeta":1,"alpha":"a","list":[1,2]}"#
        );
    }

    #[test]
    fn test_typed_accessors() {
        let values: OptionValues = [
            ("b", Value::from(false)),
            ("f", Value::from(2.5)),
            ("s", Value::from("x")),
        ]
        .into_iter()
        .collect();
        assert_eq!(values.get_bool("b"), Some(false));
        assert_eq!(values.get_f64("f"), Some(2.5));
        assert_eq!(values.get_str("s"), Some("x"));
        assert_eq!(values.get_i64("s"), None);
        assert!(!values.contains_key("missing"));
        assert_eq!(values.len(), 3);
    }
}
