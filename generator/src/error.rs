//! Error types for compiling schemas and parsing arguments.
//!
//! Compile-time errors ([`Error::is_compile_time`]) prevent a parser from
//! being built. Every other variant is returned from a single parse call and
//! leaves the parser usable.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use optparse_gen_core::SchemaError;
use thiserror::Error;

/// Errors raised by the generator and by compiled parsers.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema could not be built (wrong root type, unsupported value).
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A `no_<name>` boolean strips to the name of another option.
    #[error("option collision on {key}")]
    OptionCollision {
        /// Key of the negated option.
        key: String,
    },

    /// A `__short` flag is not exactly one usable character.
    #[error("invalid short flag for '{key}': {short:?} (expected a single character)")]
    InvalidShortFlag {
        /// Option key.
        key: String,
        /// Offending short flag.
        short: String,
    },

    /// A meta entry has the wrong type, or an option default is not a value.
    #[error("invalid configuration for '{key}': {reason}")]
    InvalidMeta {
        /// Schema key holding the entry.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two options, or an option and the help flag, register the same flag.
    #[error("duplicate flag: {flag}")]
    DuplicateFlag {
        /// The flag as typed on the command line.
        flag: String,
    },

    /// The command line contains an unrecognized option.
    #[error("invalid option: {option}")]
    InvalidOption {
        /// Option as given.
        option: String,
    },

    /// An option argument failed coercion, the allow-list, or a transform.
    #[error("invalid argument: {option} {value}{}", reason_suffix(.reason))]
    InvalidArgument {
        /// Option the argument belongs to.
        option: String,
        /// Offending argument.
        value: String,
        /// Why it was rejected, if known.
        reason: String,
    },

    /// An option requiring an argument got none, or a required option is
    /// absent.
    #[error("missing argument: {option}")]
    MissingArgument {
        /// Option (or required key) lacking a value.
        option: String,
    },

    /// Any other command-line syntax error.
    #[error("{0}")]
    Parse(Box<clap::Error>),
}

fn reason_suffix(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" ({reason})")
    }
}

impl Error {
    /// Returns `true` for errors raised while compiling a schema.
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            Self::Schema(_)
                | Self::OptionCollision { .. }
                | Self::InvalidShortFlag { .. }
                | Self::InvalidMeta { .. }
                | Self::DuplicateFlag { .. }
        )
    }

    /// Returns `true` for configuration errors in otherwise well-formed
    /// schemas.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidShortFlag { .. } | Self::InvalidMeta { .. } | Self::DuplicateFlag { .. }
        )
    }

    /// Returns `true` if the schema root was not a key/value object.
    pub fn is_wrong_argument_type(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::WrongArgumentType(_)))
    }

    /// Translates a clap parse failure.
    pub(crate) fn from_clap(err: clap::Error) -> Self {
        let context = |kind: ContextKind| match err.get(kind) {
            Some(ContextValue::String(s)) => Some(s.clone()),
            _ => None,
        };
        let option = context(ContextKind::InvalidArg).unwrap_or_default();

        match err.kind() {
            ErrorKind::UnknownArgument => Self::InvalidOption { option },
            ErrorKind::NoEquals | ErrorKind::WrongNumberOfValues | ErrorKind::TooFewValues => {
                Self::MissingArgument { option }
            }
            ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
                let value = context(ContextKind::InvalidValue).unwrap_or_default();
                if value.is_empty() && err.kind() == ErrorKind::InvalidValue {
                    return Self::MissingArgument { option };
                }
                let reason = match (context(ContextKind::Custom), err.get(ContextKind::ValidValue)) {
                    (Some(reason), _) => reason,
                    (None, Some(ContextValue::Strings(valid))) => {
                        format!("expected one of: {}", valid.join(", "))
                    }
                    _ => String::new(),
                };
                Self::InvalidArgument {
                    option,
                    value,
                    reason,
                }
            }
            _ => Self::Parse(Box::new(err)),
        }
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let collision = Error::OptionCollision { key: "no_bool".into() };
        assert!(collision.is_compile_time());
        assert!(!collision.is_configuration());

        let short = Error::InvalidShortFlag {
            key: "bool".into(),
            short: "lo".into(),
        };
        assert!(short.is_compile_time());
        assert!(short.is_configuration());

        let wrong = Error::from(SchemaError::WrongArgumentType("array".into()));
        assert!(wrong.is_wrong_argument_type());

        let missing = Error::MissingArgument { option: "val".into() };
        assert!(!missing.is_compile_time());
    }

    #[test]
    fn test_messages() {
        let collision = Error::OptionCollision { key: "no_bool".into() };
        assert_eq!(collision.to_string(), "option collision on no_bool");

        let invalid = Error::InvalidArgument {
            option: "--int".into(),
            value: "3".into(),
            reason: "expected one of: 1, 2".into(),
        };
        assert_eq!(
            invalid.to_string(),
            "invalid argument: --int 3 (expected one of: 1, 2)"
        );

        let bare = Error::InvalidArgument {
            option: "--x".into(),
            value: "y".into(),
            reason: String::new(),
        };
        assert_eq!(bare.to_string(), "invalid argument: --x y");
    }
}
