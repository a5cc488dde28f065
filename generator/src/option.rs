//! Compiled option definitions.

use optparse_gen_core::{RawValue, Transform, Value, ValueKind};
use serde::Serialize;

use crate::{Error, Result};

/// How an option consumes command-line input, decided once at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    /// Negatable switch `--[no-]<trigger>`.
    Boolean {
        /// The key began with `no_`: the stored value is the switch state
        /// inverted.
        inverted: bool,
    },
    /// Option taking one argument, `--<trigger>=ARG`.
    Scalar {
        /// Type the argument is coerced to.
        coercion: ValueKind,
        /// Accepted values, if restricted.
        allowed: Option<Vec<Value>>,
    },
}

/// One option derived from a primary schema key.
///
/// # Examples
///
/// ```
/// use optparse_gen::{GeneratorOptions, OptionKind, OptionParser};
/// use optparse_gen_core::Schema;
///
/// let schema = Schema::new().with("no_filter", true).with("max_depth", 3);
/// let parser = OptionParser::compile(&schema, &GeneratorOptions::default()).unwrap();
///
/// let filter = &parser.options()[0];
/// assert_eq!(filter.key, "no_filter");
/// assert_eq!(filter.trigger, "filter");
/// assert_eq!(filter.kind, OptionKind::Boolean { inverted: true });
/// assert_eq!(filter.switch(), "--[no-]filter");
///
/// assert_eq!(parser.options()[1].switch(), "--max-depth=ARG");
/// ```
#[derive(Debug, Clone)]
pub struct CompiledOption {
    /// Schema key, underscores preserved; also the result mapping key.
    pub key: String,
    /// Long flag name with `_` translated to `-` (and `no-` stripped for
    /// negated booleans).
    pub trigger: String,
    /// Boolean or scalar handling.
    pub kind: OptionKind,
    /// Default value from the schema.
    pub default: Value,
    /// Help text including the default.
    pub help: String,
    /// Single-character short flag.
    pub short: Option<char>,
    /// Must be given on every parse.
    pub required: bool,
    /// Custom conversion replacing coercion and negation.
    pub transform: Option<Transform>,
}

/// What the token parser matched for one option.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Matched {
    /// Switch state: `true` for `--name`, `false` for `--no-name`.
    Flag(bool),
    /// Parsed argument. Text is left uncoerced when a transform is set.
    Argument(Value),
}

impl CompiledOption {
    /// Returns `true` for boolean switches.
    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, OptionKind::Boolean { .. })
    }

    /// Returns the coercion kind of a scalar option.
    pub fn coercion(&self) -> Option<ValueKind> {
        match &self.kind {
            OptionKind::Scalar { coercion, .. } => Some(*coercion),
            OptionKind::Boolean { .. } => None,
        }
    }

    /// Long flag as shown in usage: `--[no-]name` or `--name=ARG`.
    pub fn switch(&self) -> String {
        match self.kind {
            OptionKind::Boolean { .. } => format!("--[no-]{}", self.trigger),
            OptionKind::Scalar { .. } => format!("--{}=ARG", self.trigger),
        }
    }

    /// Every long name this option registers, without dashes.
    pub fn long_names(&self) -> Vec<String> {
        match self.kind {
            OptionKind::Boolean { .. } => {
                vec![self.trigger.clone(), format!("no-{}", self.trigger)]
            }
            OptionKind::Scalar { .. } => vec![self.trigger.clone()],
        }
    }

    /// Applies the option's handler to a match.
    pub(crate) fn resolve(&self, matched: Matched) -> Result<Value> {
        if let Some(transform) = &self.transform {
            let (raw, shown) = match &matched {
                Matched::Flag(b) => (RawValue::Flag(*b), b.to_string()),
                Matched::Argument(Value::String(text)) => (RawValue::Text(text), text.clone()),
                Matched::Argument(other) => {
                    return Err(Error::InvalidArgument {
                        option: format!("--{}", self.trigger),
                        value: other.to_string(),
                        reason: "transform expects raw text".to_string(),
                    });
                }
            };
            return transform.apply(raw).map_err(|reason| Error::InvalidArgument {
                option: format!("--{}", self.trigger),
                value: shown,
                reason,
            });
        }

        match (matched, &self.kind) {
            (Matched::Flag(b), OptionKind::Boolean { inverted }) => Ok(Value::Bool(b ^ inverted)),
            (Matched::Argument(value), _) => Ok(value),
            (Matched::Flag(b), OptionKind::Scalar { .. }) => Ok(Value::Bool(b)),
        }
    }

    /// Serializable description of this option.
    pub fn summary(&self) -> OptionSummary {
        let (inverted, allowed) = match &self.kind {
            OptionKind::Boolean { inverted } => (*inverted, None),
            OptionKind::Scalar { allowed, .. } => (false, allowed.clone()),
        };
        OptionSummary {
            key: self.key.clone(),
            switch: self.switch(),
            kind: if self.is_boolean() { "boolean" } else { "scalar" },
            coercion: self.coercion(),
            inverted,
            short: self.short,
            required: self.required,
            allowed,
            transform: self.transform.is_some(),
            default: self.default.clone(),
            help: self.help.clone(),
        }
    }
}

/// Flat, serializable view of a [`CompiledOption`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionSummary {
    /// Schema key.
    pub key: String,
    /// Long flag as shown in usage.
    pub switch: String,
    /// `"boolean"` or `"scalar"`.
    pub kind: &'static str,
    /// Coercion kind of scalar options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coercion: Option<ValueKind>,
    /// Negated boolean.
    pub inverted: bool,
    /// Short flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Required option.
    pub required: bool,
    /// Allow-list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    /// A custom transform is attached.
    pub transform: bool,
    /// Default value.
    pub default: Value,
    /// Help text.
    pub help: String,
}
