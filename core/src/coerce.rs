//! Conversion of textual command-line arguments into typed [`Value`]s.

use crate::{CoercionError, Pattern, Value, ValueKind};

impl ValueKind {
    /// Converts a raw argument into a value of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError`] when `raw` is not a valid literal of this
    /// kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use optparse_gen_core::{Value, ValueKind};
    ///
    /// assert_eq!(ValueKind::Integer.coerce("0x1f").unwrap(), Value::Integer(31));
    /// assert_eq!(ValueKind::Numeric.coerce("11.1").unwrap(), Value::Float(11.1));
    /// assert_eq!(ValueKind::Numeric.coerce("11").unwrap(), Value::Integer(11));
    ///
    /// let regex = ValueKind::Regex.coerce("/11.1/").unwrap();
    /// assert_eq!(regex.as_pattern().unwrap().as_str(), "11.1");
    /// ```
    pub fn coerce(&self, raw: &str) -> Result<Value, CoercionError> {
        match self {
            Self::Boolean => parse_boolean(raw)
                .map(Value::Bool)
                .ok_or_else(|| CoercionError::new(*self, raw, "expected true/false or yes/no")),
            Self::Integer => parse_integer(raw)
                .map(Value::Integer)
                .ok_or_else(|| CoercionError::new(*self, raw, "not an integer")),
            Self::Float => parse_float(raw)
                .map(Value::Float)
                .ok_or_else(|| CoercionError::new(*self, raw, "not a number")),
            Self::Numeric => parse_integer(raw)
                .map(Value::Integer)
                .or_else(|| parse_float(raw).map(Value::Float))
                .ok_or_else(|| CoercionError::new(*self, raw, "not a number")),
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Regex => parse_regex(raw).map(Value::Regex),
            Self::List => Ok(parse_list(raw)),
        }
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "+" => Some(true),
        "false" | "no" | "-" | "nil" => Some(false),
        _ => None,
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (radix, digits) = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| body.strip_prefix(prefix).map(|rest| (*radix, rest)))
        .unwrap_or((10, body));

    if !valid_separators(digits) || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let signed = if negative {
        format!("-{cleaned}")
    } else {
        cleaned
    };
    i64::from_str_radix(&signed, radix).ok()
}

fn parse_float(raw: &str) -> Option<f64> {
    let body = raw
        .strip_prefix('-')
        .or_else(|| raw.strip_prefix('+'))
        .unwrap_or(raw);
    // Rejects the `inf`/`nan` spellings `f64::from_str` would accept.
    if body.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if body.split(['.', 'e', 'E']).any(|part| !valid_separators(part) && !part.is_empty()) {
        return None;
    }
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// `_` may only separate digits.
fn valid_separators(digits: &str) -> bool {
    !digits.is_empty() && !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__")
}

fn parse_regex(raw: &str) -> Result<Pattern, CoercionError> {
    let (source, flags) = match raw.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
        Some((source, flags)) => (source, flags),
        None => (raw, ""),
    };

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' => inline.push('i'),
            // Dot matches newline.
            'm' => inline.push('s'),
            'x' => inline.push('x'),
            other => {
                return Err(CoercionError::new(
                    ValueKind::Regex,
                    raw,
                    format!("unsupported flag '{other}'"),
                ));
            }
        }
    }

    let full = if inline.is_empty() {
        source.to_string()
    } else {
        format!("(?{inline}){source}")
    };
    Pattern::new(&full).map_err(|err| CoercionError::new(ValueKind::Regex, raw, err.to_string()))
}

fn parse_list(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::List(Vec::new());
    }
    Value::List(raw.split(',').map(Value::from).collect())
}
