//! clap value parser that coerces option arguments and enforces allow-lists.

use std::ffi::OsStr;

use clap::builder::{PossibleValue, TypedValueParser};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, Command};
use optparse_gen_core::{Value, ValueKind};

/// Converts the text of a scalar option into a [`Value`].
///
/// With `verbatim` set (options carrying a transform) the text is passed
/// through as [`Value::String`] for the transform to convert; the allow-list
/// is still checked against it.
#[derive(Debug, Clone)]
pub struct CoercingParser {
    kind: ValueKind,
    allowed: Option<Vec<Value>>,
    verbatim: bool,
}

impl CoercingParser {
    /// Creates a parser coercing to `kind`.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            allowed: None,
            verbatim: false,
        }
    }

    /// Restricts accepted arguments to `allowed`.
    pub fn with_allowed(mut self, allowed: Option<Vec<Value>>) -> Self {
        self.allowed = allowed;
        self
    }

    /// Skips coercion, yielding the raw text.
    pub fn verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = verbatim;
        self
    }

    /// Converts `raw`, returning the rejection reason on failure.
    pub fn convert(&self, raw: &str) -> Result<Value, Rejection> {
        let value = if self.verbatim {
            Value::String(raw.to_string())
        } else {
            if raw.is_empty() && self.kind != ValueKind::String {
                return Err(Rejection::Empty);
            }
            self.kind
                .coerce(raw)
                .map_err(|err| Rejection::Invalid(err.reason))?
        };

        match &self.allowed {
            Some(allowed) if !allowed.iter().any(|a| a == &value || a.to_string() == raw) => {
                Err(Rejection::NotAllowed(
                    allowed.iter().map(ToString::to_string).collect(),
                ))
            }
            _ => Ok(value),
        }
    }
}

/// Why [`CoercingParser::convert`] rejected an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No text was given.
    Empty,
    /// Coercion failed.
    Invalid(String),
    /// Not in the allow-list, which is attached.
    NotAllowed(Vec<String>),
}

impl TypedValueParser for CoercingParser {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;

        self.convert(raw).map_err(|rejection| {
            let kind = match rejection {
                Rejection::Invalid(_) => ErrorKind::ValueValidation,
                Rejection::Empty | Rejection::NotAllowed(_) => ErrorKind::InvalidValue,
            };
            let mut err = clap::Error::new(kind).with_cmd(cmd);
            let shown = arg.map(flag_name).unwrap_or_else(|| "...".to_string());
            err.insert(ContextKind::InvalidArg, ContextValue::String(shown));
            err.insert(ContextKind::InvalidValue, ContextValue::String(raw.to_string()));
            match rejection {
                Rejection::Invalid(reason) => {
                    err.insert(ContextKind::Custom, ContextValue::String(reason));
                }
                Rejection::NotAllowed(valid) => {
                    err.insert(ContextKind::ValidValue, ContextValue::Strings(valid));
                }
                Rejection::Empty => {}
            }
            err
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        self.allowed.as_ref().map(|allowed| {
            Box::new(allowed.iter().map(|value| PossibleValue::new(value.to_string())))
                as Box<dyn Iterator<Item = PossibleValue> + '_>
        })
    }
}

/// Names `arg` as typed on the command line. `Display for Arg` needs a built
/// command, and `parse_ref` may be called with one that is not.
fn flag_name(arg: &Arg) -> String {
    match arg.get_long() {
        Some(long) => format!("--{long}"),
        None => arg.get_id().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerces_by_kind() {
        let parser = CoercingParser::new(ValueKind::Integer);
        assert_eq!(parser.convert("11"), Ok(Value::from(11)));
        assert!(matches!(parser.convert("eleven"), Err(Rejection::Invalid(_))));
        assert_eq!(parser.convert(""), Err(Rejection::Empty));

        let parser = CoercingParser::new(ValueKind::String);
        assert_eq!(parser.convert(""), Ok(Value::from("")));
    }

    #[test]
    fn test_allow_list() {
        let parser = CoercingParser::new(ValueKind::Integer)
            .with_allowed(Some(vec![Value::from(1), Value::from(2)]));
        assert_eq!(parser.convert("2"), Ok(Value::from(2)));
        assert_eq!(
            parser.convert("3"),
            Err(Rejection::NotAllowed(vec!["1".to_string(), "2".to_string()]))
        );
    }

    #[test]
    fn test_verbatim_keeps_text_and_checks_allow_list() {
        let parser = CoercingParser::new(ValueKind::Integer)
            .verbatim(true)
            .with_allowed(Some(vec![Value::from(1), Value::from("x")]));
        assert_eq!(parser.convert("x"), Ok(Value::from("x")));
        assert_eq!(parser.convert("1"), Ok(Value::from("1")));
        assert!(matches!(parser.convert("2"), Err(Rejection::NotAllowed(_))));
    }

    #[test]
    fn test_parse_ref_reports_context() {
        let mut cmd = Command::new("test").arg(Arg::new("int").long("int").value_name("ARG"));
        cmd.build();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "int")
            .unwrap()
            .clone();
        let parser = CoercingParser::new(ValueKind::Integer)
            .with_allowed(Some(vec![Value::from(1), Value::from(2)]));

        let err = parser
            .parse_ref(&cmd, Some(&arg), OsStr::new("3"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(
            err.get(ContextKind::InvalidValue),
            Some(&ContextValue::String("3".to_string()))
        );
        assert_eq!(
            err.get(ContextKind::InvalidArg),
            Some(&ContextValue::String("--int".to_string()))
        );

        let err = parser
            .parse_ref(&cmd, Some(&arg), OsStr::new("x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_ref_accepts_unbuilt_arg() {
        let cmd = Command::new("test");
        let parser = CoercingParser::new(ValueKind::Integer);

        let long = Arg::new("int").long("int");
        let err = parser
            .parse_ref(&cmd, Some(&long), OsStr::new("x"))
            .unwrap_err();
        assert_eq!(
            err.get(ContextKind::InvalidArg),
            Some(&ContextValue::String("--int".to_string()))
        );

        let positional = Arg::new("count");
        let err = parser
            .parse_ref(&cmd, Some(&positional), OsStr::new("x"))
            .unwrap_err();
        assert_eq!(
            err.get(ContextKind::InvalidArg),
            Some(&ContextValue::String("count".to_string()))
        );
    }

    #[test]
    fn test_possible_values_follow_allow_list() {
        let parser = CoercingParser::new(ValueKind::String)
            .with_allowed(Some(vec![Value::from("a"), Value::from("b")]));
        let names: Vec<_> = parser
            .possible_values()
            .into_iter()
            .flatten()
            .map(|pv| pv.get_name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(CoercingParser::new(ValueKind::String).possible_values().is_none());
    }
}
