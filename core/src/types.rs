//! Value and coercion-kind definitions.
//!
//! [`Value`] is the runtime representation of every default and every parsed
//! option value. [`ValueKind`] names the type a textual command-line argument
//! is coerced to; see [`ValueKind::coerce`](crate::ValueKind::coerce).

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::SchemaError;

/// A compiled regular expression that compares and serializes by its source.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::Pattern;
///
/// let pattern = Pattern::new(r"\w+").unwrap();
/// assert!(pattern.is_match("word"));
/// assert_eq!(pattern, Pattern::new(r"\w+").unwrap());
/// assert_eq!(pattern.to_string(), r"/\w+/");
/// ```
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compiles `source` into a pattern.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`regex::Error`] when `source` is not a valid
    /// regular expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Returns the pattern source.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.0
    }

    /// Returns `true` if `haystack` contains a match.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A default or parsed option value.
///
/// The variant of a primary key's default decides how the option is compiled:
/// [`Value::Bool`] defaults become negatable switches, everything else becomes
/// an option taking an argument.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::Value;
///
/// assert_eq!(Value::from(12).to_string(), "12");
/// assert_eq!(Value::from("yep").to_string(), "yep");
/// assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
/// assert!(Value::from(true).is_bool());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean switch value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free text.
    String(String),
    /// Regular expression.
    Regex(Pattern),
    /// Flat list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns the boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Integer`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as `f64` for [`Value::Float`] and [`Value::Integer`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the text, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the pattern, if this is a [`Value::Regex`].
    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Self::Regex(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the items, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fractional part of whole floats ("12.0").
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
            Self::Regex(p) => write!(f, "{p}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Self::Regex(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// Target type for coercing a textual command-line argument.
///
/// Parsed from a type name with [`FromStr`]; legacy integer names such as
/// `Fixnum` and `Bignum` normalize to [`ValueKind::Integer`].
///
/// # Examples
///
/// ```
/// use optparse_gen_core::{Value, ValueKind};
///
/// assert_eq!("Fixnum".parse::<ValueKind>().unwrap(), ValueKind::Integer);
/// assert_eq!("Regexp".parse::<ValueKind>().unwrap(), ValueKind::Regex);
/// assert_eq!(ValueKind::of(&Value::from(1.5)), ValueKind::Float);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    /// `true`/`yes`/`+` or `false`/`no`/`-`/`nil`.
    Boolean,
    /// Integer with optional sign, `0x`/`0o`/`0b` prefix and `_` separators.
    Integer,
    /// Floating point number.
    Float,
    /// Integer when the text is integral, float otherwise.
    Numeric,
    /// Text taken verbatim.
    String,
    /// Regular expression, bare or as `/pattern/flags`.
    Regex,
    /// Comma-separated list of strings.
    List,
}

impl ValueKind {
    /// Infers the coercion kind from a default value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Integer(_) => Self::Integer,
            Value::Float(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Regex(_) => Self::Regex,
            Value::List(_) => Self::List,
        }
    }

    /// Canonical type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Numeric => "Numeric",
            Self::String => "String",
            Self::Regex => "Regex",
            Self::List => "List",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "fixnum" | "bignum" | "i64" => Ok(Self::Integer),
            "float" | "f64" => Ok(Self::Float),
            "numeric" | "number" => Ok(Self::Numeric),
            "string" | "str" => Ok(Self::String),
            "regexp" | "regex" => Ok(Self::Regex),
            "array" | "list" => Ok(Self::List),
            "boolean" | "bool" | "trueclass" | "falseclass" => Ok(Self::Boolean),
            _ => Err(SchemaError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display_matches_help_format() {
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Float(12.0).to_string(), "12.0");
        assert_eq!(Value::Float(11.1).to_string(), "11.1");
        assert_eq!(Value::from("yep").to_string(), "yep");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).to_string(),
            "[1, a]"
        );
        assert_eq!(
            Value::Regex(Pattern::new(r"\s").unwrap()).to_string(),
            r"/\s/"
        );
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(4).as_i64(), Some(4));
        assert_eq!(Value::from(4).as_f64(), Some(4.0));
        assert_eq!(Value::from("x").as_i64(), None);
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(vec!["a"]).as_list().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let value = Value::from(vec![
            Value::from(1),
            Value::from(true),
            Value::Regex(Pattern::new("a+").unwrap()),
        ]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,true,"a+"]"#);
    }

    #[test]
    fn test_kind_from_str_normalizes_aliases() {
        for name in ["Integer", "Fixnum", "Bignum", "int"] {
            assert_eq!(name.parse::<ValueKind>().unwrap(), ValueKind::Integer);
        }
        assert_eq!("Numeric".parse::<ValueKind>().unwrap(), ValueKind::Numeric);
        assert_eq!("Array".parse::<ValueKind>().unwrap(), ValueKind::List);
        assert_eq!("TrueClass".parse::<ValueKind>().unwrap(), ValueKind::Boolean);
        assert!(matches!(
            "Hash".parse::<ValueKind>(),
            Err(SchemaError::UnknownKind(name)) if name == "Hash"
        ));
    }

    #[test]
    fn test_kind_of_default() {
        assert_eq!(ValueKind::of(&Value::from(12)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&Value::from("s")), ValueKind::String);
        assert_eq!(ValueKind::of(&Value::from(vec![1])), ValueKind::List);
    }
}
