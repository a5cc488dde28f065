//! The ordered defaults-with-metadata schema.
//!
//! A [`Schema`] maps keys to [`Entry`] values, preserving insertion order.
//! Keys ending in one of the [`MetaKey`] suffixes configure the option named
//! by the rest of the key; every other key defines an option whose default is
//! the entry's [`Value`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::{OptionValues, SchemaError, Value, ValueKind};

/// Metadata suffixes recognized on schema keys.
///
/// Recognition is purely structural: the key is translated `_` → `-` and
/// matched against the `--<postfix>` endings.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::MetaKey;
///
/// assert_eq!(MetaKey::classify("bool__short"), Some((MetaKey::Short, "bool")));
/// assert_eq!(MetaKey::classify("no_color__help"), Some((MetaKey::Help, "no_color")));
/// assert_eq!(MetaKey::classify("helpful"), None);
/// assert_eq!(MetaKey::Values.key_for("level"), "level__values");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// `__help`: description shown in usage text.
    Help,
    /// `__short`: single-character short flag.
    Short,
    /// `__values`: allow-list for option arguments.
    Values,
    /// `__class`: coercion kind override.
    Class,
    /// `__proc`: custom transform replacing coercion and negation.
    Proc,
    /// `__required`: option must be given on every parse.
    Required,
}

impl MetaKey {
    /// Every recognized meta key.
    pub const ALL: [Self; 6] = [
        Self::Help,
        Self::Short,
        Self::Values,
        Self::Class,
        Self::Proc,
        Self::Required,
    ];

    /// Postfix name without separators (e.g. `"help"`).
    pub fn postfix(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Short => "short",
            Self::Values => "values",
            Self::Class => "class",
            Self::Proc => "proc",
            Self::Required => "required",
        }
    }

    /// Builds the meta key configuring `primary` (e.g. `"bool__help"`).
    pub fn key_for(&self, primary: &str) -> String {
        format!("{primary}__{}", self.postfix())
    }

    /// Splits a meta key into its kind and the primary key it configures.
    ///
    /// Returns `None` for primary keys.
    pub fn classify(key: &str) -> Option<(Self, &str)> {
        let trigger = key.replace('_', "-");
        Self::ALL.into_iter().find_map(|meta| {
            let ending = format!("--{}", meta.postfix());
            if trigger.ends_with(&ending) {
                // `_` and `-` are both one byte, so offsets carry over.
                key.get(..key.len() - ending.len()).map(|primary| (meta, primary))
            } else {
                None
            }
        })
    }

    /// Returns `true` if `key` is a meta key.
    pub fn is_meta(key: &str) -> bool {
        Self::classify(key).is_some()
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__{}", self.postfix())
    }
}

/// Raw input handed to a [`Transform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    /// A boolean switch fired; `true` for `--name`, `false` for `--no-name`.
    Flag(bool),
    /// The uncoerced argument text of an option.
    Text(&'a str),
}

type TransformFn = dyn Fn(RawValue<'_>) -> Result<Value, String> + Send + Sync;

/// Custom conversion attached with a `__proc` meta key.
///
/// A transform replaces the built-in coercion and negation entirely: its
/// return value is stored as the option's value. Returning `Err(message)`
/// rejects the argument.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::{RawValue, Transform, Value};
///
/// let upper = Transform::new(|raw| match raw {
///     RawValue::Text(text) => Ok(Value::from(text.to_uppercase())),
///     RawValue::Flag(b) => Ok(Value::from(b)),
/// });
/// assert_eq!(upper.apply(RawValue::Text("abc")).unwrap(), Value::from("ABC"));
/// ```
#[derive(Clone)]
pub struct Transform(Arc<TransformFn>);

impl Transform {
    /// Wraps a conversion function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(RawValue<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs the conversion.
    ///
    /// # Errors
    ///
    /// Returns the message produced by the wrapped function.
    pub fn apply(&self, raw: RawValue<'_>) -> Result<Value, String> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A schema entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A default value, or the value of a data-carrying meta key.
    Value(Value),
    /// A `__class` coercion override.
    Kind(ValueKind),
    /// A `__proc` transform.
    Transform(Transform),
}

impl Entry {
    /// Returns the value, if this entry holds one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the kind, if this entry is a class override.
    pub fn as_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Kind(k) => Some(*k),
            _ => None,
        }
    }

    /// Returns the transform, if this entry holds one.
    pub fn as_transform(&self) -> Option<&Transform> {
        match self {
            Self::Transform(t) => Some(t),
            _ => None,
        }
    }

    /// Short description of the entry's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Integer(_)) => "integer",
            Self::Value(Value::Float(_)) => "float",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Regex(_)) => "regex",
            Self::Value(Value::List(_)) => "list",
            Self::Kind(_) => "class",
            Self::Transform(_) => "transform",
        }
    }
}

macro_rules! entry_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Entry {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

entry_from_value!(bool, i64, i32, f64, &str, String, crate::Pattern);

impl<T: Into<Value>> From<Vec<T>> for Entry {
    fn from(value: Vec<T>) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<ValueKind> for Entry {
    fn from(kind: ValueKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Transform> for Entry {
    fn from(transform: Transform) -> Self {
        Self::Transform(transform)
    }
}

/// Ordered option defaults plus per-option metadata.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::{MetaKey, Schema, Value};
///
/// let schema = Schema::new()
///     .with("verbose", false)
///     .with_help("verbose", "print more")
///     .with_short("verbose", "v")
///     .with("level", 2)
///     .with_values("level", vec![1, 2, 3]);
///
/// assert_eq!(schema.primary_keys().collect::<Vec<_>>(), vec!["verbose", "level"]);
/// assert_eq!(
///     schema.meta("verbose", MetaKey::Short).and_then(|e| e.as_value()),
///     Some(&Value::from("v"))
/// );
/// assert_eq!(schema.defaults().get_i64("level"), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entries: Vec<(String, Entry)>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry, returning the schema.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    /// Attaches `__help` text to `key`.
    pub fn with_help(self, key: &str, help: impl Into<String>) -> Self {
        self.with(MetaKey::Help.key_for(key), Value::String(help.into()))
    }

    /// Attaches a `__short` flag to `key`.
    pub fn with_short(self, key: &str, short: impl Into<String>) -> Self {
        self.with(MetaKey::Short.key_for(key), Value::String(short.into()))
    }

    /// Attaches a `__values` allow-list to `key`.
    pub fn with_values<T: Into<Value>>(self, key: &str, values: Vec<T>) -> Self {
        self.with(MetaKey::Values.key_for(key), values)
    }

    /// Attaches a `__class` coercion override to `key`.
    pub fn with_class(self, key: &str, kind: ValueKind) -> Self {
        self.with(MetaKey::Class.key_for(key), kind)
    }

    /// Attaches a `__proc` transform to `key`.
    pub fn with_proc(self, key: &str, transform: Transform) -> Self {
        self.with(MetaKey::Proc.key_for(key), transform)
    }

    /// Marks `key` as `__required`.
    pub fn with_required(self, key: &str, required: bool) -> Self {
        self.with(MetaKey::Required.key_for(key), required)
    }

    /// Inserts an entry. An existing key keeps its position and its previous
    /// entry is returned.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Option<Entry> {
        let key = key.into();
        let entry = entry.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, entry)),
            None => {
                self.entries.push((key, entry));
                None
            }
        }
    }

    /// Removes an entry.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// Looks up the meta entry of kind `meta` configuring `primary`.
    pub fn meta(&self, primary: &str, meta: MetaKey) -> Option<&Entry> {
        self.get(&meta.key_for(primary))
    }

    /// Returns `true` if the schema contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over all entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Iterates over keys that define options (meta keys excluded).
    pub fn primary_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| !MetaKey::is_meta(k))
    }

    /// Iterates over meta keys whose primary key is not in the schema.
    pub fn orphan_meta_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| match MetaKey::classify(k) {
            Some((_, primary)) if !self.contains_key(primary) => Some(k.as_str()),
            _ => None,
        })
    }

    /// Number of entries, meta keys included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the schema has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default values of all primary keys that hold a [`Value`].
    pub fn defaults(&self) -> OptionValues {
        self.entries
            .iter()
            .filter(|(k, _)| !MetaKey::is_meta(k))
            .filter_map(|(k, e)| e.as_value().map(|v| (k.clone(), v.clone())))
            .collect()
    }

    /// Parses a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] for malformed JSON and the errors of
    /// [`Schema::try_from`] otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use optparse_gen_core::{Entry, Schema, SchemaError, ValueKind};
    ///
    /// let schema = Schema::from_json_str(r#"{"num": 12, "num__class": "Numeric"}"#).unwrap();
    /// assert_eq!(schema.get("num__class"), Some(&Entry::Kind(ValueKind::Numeric)));
    ///
    /// let err = Schema::from_json_str("[1, 2]").unwrap_err();
    /// assert!(matches!(err, SchemaError::WrongArgumentType(_)));
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let json: JsonValue = serde_json::from_str(text)?;
        Self::try_from(&json)
    }
}

impl<K: Into<String>, E: Into<Entry>> FromIterator<(K, E)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut schema = Self::new();
        for (key, entry) in iter {
            schema.insert(key, entry);
        }
        schema
    }
}

impl TryFrom<&JsonValue> for Schema {
    type Error = SchemaError;

    fn try_from(json: &JsonValue) -> Result<Self, Self::Error> {
        let JsonValue::Object(map) = json else {
            return Err(SchemaError::WrongArgumentType(json_type_name(json).to_string()));
        };

        let mut schema = Self::new();
        for (key, value) in map {
            let entry = match MetaKey::classify(key) {
                Some((MetaKey::Class, _)) => match value {
                    JsonValue::String(name) => Entry::Kind(name.parse()?),
                    other => return Err(unsupported(key, other)),
                },
                Some((MetaKey::Proc, _)) => {
                    return Err(SchemaError::UnsupportedValue {
                        key: key.clone(),
                        found: "transforms cannot be expressed in JSON".to_string(),
                    });
                }
                _ => Entry::Value(json_to_value(key, value, true)?),
            };
            schema.insert(key.clone(), entry);
        }
        Ok(schema)
    }
}

impl TryFrom<JsonValue> for Schema {
    type Error = SchemaError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        Self::try_from(&json)
    }
}

fn json_to_value(key: &str, json: &JsonValue, allow_list: bool) -> Result<Value, SchemaError> {
    match json {
        JsonValue::Bool(b) => Ok(Value::Bool(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Integer(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| unsupported(key, json)),
        },
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(items) if allow_list => items
            .iter()
            .map(|item| json_to_value(key, item, false))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(unsupported(key, other)),
    }
}

fn unsupported(key: &str, json: &JsonValue) -> SchemaError {
    SchemaError::UnsupportedValue {
        key: key.to_string(),
        found: json_type_name(json).to_string(),
    }
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
