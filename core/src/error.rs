//! Error types for schema ingestion and value coercion.

use thiserror::Error;

use crate::ValueKind;

/// Errors raised while building a [`Schema`](crate::Schema).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema root is not a key/value object.
    #[error("wrong argument type: expected an object of option defaults, found {0}")]
    WrongArgumentType(String),

    /// A schema entry holds a value that cannot define or configure an option.
    #[error("unsupported value for '{key}': {found}")]
    UnsupportedValue {
        /// Schema key holding the value.
        key: String,
        /// Description of what was found.
        found: String,
    },

    /// A `__class` entry names an unknown value kind.
    #[error("unknown value kind: {0}")]
    UnknownKind(String),

    /// Schema text is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A textual argument could not be converted to the requested kind.
///
/// # Examples
///
/// ```
/// use optparse_gen_core::ValueKind;
///
/// let err = ValueKind::Integer.coerce("twelve").unwrap_err();
/// assert_eq!(err.kind, ValueKind::Integer);
/// assert_eq!(err.input, "twelve");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value {input:?}: {reason}")]
pub struct CoercionError {
    /// Kind the input was coerced to.
    pub kind: ValueKind,
    /// Raw input text.
    pub input: String,
    /// Why the conversion failed.
    pub reason: String,
}

impl CoercionError {
    pub(crate) fn new(kind: ValueKind, input: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
