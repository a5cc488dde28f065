//! The compiled option parser.

use std::collections::HashSet;
use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use optparse_gen_core::{OptionValues, Schema, Value};
use serde_json::Value as JsonValue;
use tracing::trace;

use crate::compile::compile_options;
use crate::option::{CompiledOption, Matched, OptionKind};
use crate::validate::{shares_flags, validate_options};
use crate::value_parser::CoercingParser;
use crate::{Error, GeneratorOptions, Result};

const OPERANDS: &str = "operands:";

/// A command-line parser compiled from a [`Schema`].
///
/// The parser is immutable: every call to [`parse`](Self::parse) starts from
/// a private copy of the defaults and returns it, so calls never affect each
/// other and the parser may be shared between threads.
///
/// # Examples
///
/// ```
/// use optparse_gen::{GeneratorOptions, OptionParser};
/// use optparse_gen_core::Schema;
///
/// let schema = Schema::new()
///     .with("bool", true)
///     .with("int", 12)
///     .with_values("int", vec![1, 11, 12]);
/// let parser = OptionParser::compile(&schema, &GeneratorOptions::default()).unwrap();
///
/// let values = parser.parse(["--no-bool", "--int=11"]).unwrap();
/// assert_eq!(values.get_bool("bool"), Some(false));
/// assert_eq!(values.get_i64("int"), Some(11));
///
/// // Defaults are untouched by the previous call.
/// assert_eq!(parser.parse(Vec::<String>::new()).unwrap(), schema.defaults());
/// ```
#[derive(Debug, Clone)]
pub struct OptionParser {
    options: Vec<CompiledOption>,
    defaults: OptionValues,
    settings: GeneratorOptions,
    program_name: String,
}

impl OptionParser {
    /// Compiles `schema` into a parser.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionCollision`] for an unignored `no_` collision
    /// and a configuration error ([`Error::is_configuration`]) for bad
    /// metadata or clashing flags.
    pub fn compile(schema: &Schema, settings: &GeneratorOptions) -> Result<Self> {
        let options = compile_options(schema, settings)?;
        validate_options(&options, !settings.generate_no_help)?;

        let parser = Self {
            options,
            defaults: schema.defaults(),
            settings: settings.clone(),
            program_name: settings.resolved_program_name(),
        };
        parser.command().build();
        Ok(parser)
    }

    /// Builds the schema from JSON and compiles it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `json` is not an object of supported
    /// values, and the errors of [`compile`](Self::compile) otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use optparse_gen::{GeneratorOptions, OptionParser};
    /// use serde_json::json;
    ///
    /// let err = OptionParser::from_json(&json!([1, 2]), &GeneratorOptions::default()).unwrap_err();
    /// assert!(err.is_wrong_argument_type());
    /// ```
    pub fn from_json(json: &JsonValue, settings: &GeneratorOptions) -> Result<Self> {
        Self::compile(&Schema::try_from(json)?, settings)
    }

    /// Compiled options, in schema order.
    pub fn options(&self) -> &[CompiledOption] {
        &self.options
    }

    /// Looks up a compiled option by key.
    pub fn option(&self, key: &str) -> Option<&CompiledOption> {
        self.options.iter().find(|option| option.key == key)
    }

    /// Default values every parse starts from.
    pub fn defaults(&self) -> &OptionValues {
        &self.defaults
    }

    /// Settings the parser was compiled with.
    pub fn settings(&self) -> &GeneratorOptions {
        &self.settings
    }

    /// Program name shown in usage text.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Parses `args` (without the program name).
    ///
    /// `--help` prints usage to stdout and exits the process with status 0
    /// unless the help flag was suppressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`], [`Error::InvalidArgument`],
    /// [`Error::MissingArgument`] or [`Error::Parse`]. The parser stays
    /// usable after an error.
    pub fn parse<I, T>(&self, args: I) -> Result<OptionValues>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.run(args).map(|(values, _)| values)
    }

    /// Parses `args` and replaces them with the unconsumed operands.
    ///
    /// On error `args` is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use optparse_gen::{GeneratorOptions, OptionParser};
    /// use optparse_gen_core::Schema;
    ///
    /// let schema = Schema::new().with("verbose", false);
    /// let parser = OptionParser::compile(&schema, &GeneratorOptions::default()).unwrap();
    ///
    /// let mut args = vec!["file.txt".to_string(), "--verbose".to_string(), "--".to_string(), "--raw".to_string()];
    /// let values = parser.parse_in_place(&mut args).unwrap();
    /// assert_eq!(values.get_bool("verbose"), Some(true));
    /// assert_eq!(args, vec!["file.txt", "--raw"]);
    /// ```
    pub fn parse_in_place(&self, args: &mut Vec<String>) -> Result<OptionValues> {
        let (values, operands) = self.run(args.iter())?;
        *args = operands;
        Ok(values)
    }

    /// Parses the arguments of the running process.
    pub fn parse_env(&self) -> Result<OptionValues> {
        self.parse(std::env::args_os().skip(1))
    }

    /// Renders the full help text without exiting.
    pub fn render_help(&self) -> String {
        self.command().render_help().to_string()
    }

    /// Renders the one-line usage without exiting.
    pub fn render_usage(&self) -> String {
        self.command().render_usage().to_string()
    }

    fn run<I, T>(&self, args: I) -> Result<(OptionValues, Vec<String>)>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) if err.kind() == ErrorKind::DisplayHelp => err.exit(),
            Err(err) => return Err(Error::from_clap(err)),
        };

        let mut values = self.defaults.clone();
        let mut given: HashSet<&str> = HashSet::new();
        for option in &self.options {
            let Some(matched) = match_option(&matches, option) else {
                continue;
            };
            values.set(option.key.clone(), option.resolve(matched)?);
            given.insert(&option.key);
        }

        if let Some(missing) = self
            .options
            .iter()
            .find(|option| option.required && !given.contains(option.key.as_str()))
        {
            return Err(Error::MissingArgument {
                option: missing.key.clone(),
            });
        }

        let operands: Vec<String> = matches
            .try_get_many::<String>(OPERANDS)
            .ok()
            .flatten()
            .map(|operands| operands.cloned().collect())
            .unwrap_or_default();

        trace!(matched = ?given, operands = operands.len(), "parsed arguments");
        Ok((values, operands))
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.program_name.clone())
            .no_binary_name(true)
            .infer_long_args(true)
            .args_override_self(true)
            .disable_version_flag(true)
            .disable_help_flag(self.settings.generate_no_help);
        if let Some(about) = &self.settings.about {
            command = command.about(about.clone());
        }

        for (index, option) in self.options.iter().enumerate() {
            command = match &option.kind {
                OptionKind::Boolean { .. } => {
                    match self.options[..index].iter().find(|o| shares_flags(o, option)) {
                        Some(owner) => share_flag(command, owner, option),
                        None => command.args(boolean_args(option)),
                    }
                }
                OptionKind::Scalar { coercion, allowed } => {
                    let parser = CoercingParser::new(*coercion)
                        .with_allowed(allowed.clone())
                        .verbatim(option.transform.is_some());
                    let mut arg = Arg::new(scalar_id(option))
                        .long(option.trigger.clone())
                        .value_name("ARG")
                        .action(ArgAction::Set)
                        .num_args(1)
                        .allow_hyphen_values(true)
                        .help(option.help.clone())
                        .value_parser(parser);
                    if let Some(short) = option.short {
                        arg = arg.short(short);
                    }
                    command.arg(arg)
                }
            };
        }

        command.arg(
            Arg::new(OPERANDS)
                .value_name("ARGS")
                .num_args(0..)
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String))
                .hide(true),
        )
    }
}

fn scalar_id(option: &CompiledOption) -> String {
    format!("value:{}", option.key)
}

fn on_id(trigger: &str) -> String {
    format!("on:{trigger}")
}

fn off_id(trigger: &str) -> String {
    format!("off:{trigger}")
}

fn boolean_args(option: &CompiledOption) -> [Arg; 2] {
    let (on, off) = (on_id(&option.trigger), off_id(&option.trigger));
    let mut positive = Arg::new(on.clone())
        .long(option.trigger.clone())
        .action(ArgAction::SetTrue)
        .help(option.help.clone())
        .overrides_with(off.clone());
    if let Some(short) = option.short {
        positive = positive.short(short);
    }
    let negative = Arg::new(off)
        .long(format!("no-{}", option.trigger))
        .action(ArgAction::SetTrue)
        .overrides_with(on);
    [positive, negative]
}

/// Adds the short flag of a boolean registered through `owner`'s flag pair.
fn share_flag(command: Command, owner: &CompiledOption, option: &CompiledOption) -> Command {
    let Some(short) = option.short else {
        return command;
    };
    command.mut_arg(on_id(&owner.trigger), |arg| match arg.get_short() {
        None => arg.short(short),
        Some(_) => arg.visible_short_alias(short),
    })
}

fn match_option(matches: &ArgMatches, option: &CompiledOption) -> Option<Matched> {
    match option.kind {
        OptionKind::Boolean { .. } => {
            let on = fired(matches, &on_id(&option.trigger));
            let off = fired(matches, &off_id(&option.trigger));
            match (on, off) {
                (Some(on), Some(off)) => Some(Matched::Flag(on > off)),
                (Some(_), None) => Some(Matched::Flag(true)),
                (None, Some(_)) => Some(Matched::Flag(false)),
                (None, None) => None,
            }
        }
        OptionKind::Scalar { .. } => matches
            .try_get_one::<Value>(&scalar_id(option))
            .ok()
            .flatten()
            .cloned()
            .map(Matched::Argument),
    }
}

/// Position of a flag given on the command line, ignoring defaults.
fn fired(matches: &ArgMatches, id: &str) -> Option<usize> {
    match matches.value_source(id) {
        Some(ValueSource::CommandLine) => matches.index_of(id).or(Some(0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use optparse_gen_core::{RawValue, Transform, ValueKind};

    use super::*;

    fn compile(schema: &Schema) -> OptionParser {
        OptionParser::compile(schema, &GeneratorOptions::new().with_program_name("test")).unwrap()
    }

    #[test]
    fn test_repeated_option_last_wins() {
        let parser = compile(&Schema::new().with("int", 1).with("bool", false));
        let values = parser
            .parse(["--int=2", "--int", "3", "--bool", "--no-bool"])
            .unwrap();
        assert_eq!(values.get_i64("int"), Some(3));
        assert_eq!(values.get_bool("bool"), Some(false));

        let values = parser.parse(["--no-bool", "--bool"]).unwrap();
        assert_eq!(values.get_bool("bool"), Some(true));
    }

    #[test]
    fn test_short_flags() {
        let schema = Schema::new()
            .with("verbose", false)
            .with_short("verbose", "v")
            .with("level", 1)
            .with_short("level", "l");
        let values = compile(&schema).parse(["-v", "-l", "4"]).unwrap();
        assert_eq!(values.get_bool("verbose"), Some(true));
        assert_eq!(values.get_i64("level"), Some(4));
    }

    #[test]
    fn test_negative_numbers() {
        let parser = compile(&Schema::new().with("offset", 0).with("ratio", 1.0));
        let values = parser.parse(["--offset", "-3", "--ratio", "-0.5"]).unwrap();
        assert_eq!(values.get_i64("offset"), Some(-3));
        assert_eq!(values.get_f64("ratio"), Some(-0.5));
    }

    #[test]
    fn test_unknown_option() {
        let parser = compile(&Schema::new().with("bool", true));
        let err = parser.parse(["--nope"]).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }), "{err}");
    }

    #[test]
    fn test_missing_value() {
        let parser = compile(&Schema::new().with("int", 1));
        let err = parser.parse(["--int"]).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { .. }), "{err}");
    }

    #[test]
    fn test_shared_flags_apply_each_polarity() {
        let schema = Schema::new()
            .with("bool", true)
            .with_short("bool", "b")
            .with("no_bool", true)
            .with_short("no_bool", "n");
        let parser = OptionParser::compile(
            &schema,
            &GeneratorOptions::new().with_ignore_collisions(true),
        )
        .unwrap();

        let values = parser.parse(["--bool"]).unwrap();
        assert_eq!(values.get_bool("bool"), Some(true));
        assert_eq!(values.get_bool("no_bool"), Some(false));

        let values = parser.parse(["--no-bool"]).unwrap();
        assert_eq!(values.get_bool("bool"), Some(false));
        assert_eq!(values.get_bool("no_bool"), Some(true));

        let values = parser.parse(["-n"]).unwrap();
        assert_eq!(values.get_bool("bool"), Some(true));
        assert_eq!(values.get_bool("no_bool"), Some(false));
    }

    #[test]
    fn test_transform_on_boolean_receives_raw_flag() {
        let schema = Schema::new()
            .with("no_color", true)
            .with_proc("no_color", Transform::new(|raw| match raw {
                RawValue::Flag(b) => Ok(Value::from(if b { "always" } else { "never" })),
                RawValue::Text(t) => Ok(Value::from(t)),
            }));
        let parser = compile(&schema);
        assert_eq!(
            parser.parse(["--color"]).unwrap().get_str("no_color"),
            Some("always")
        );
        assert_eq!(
            parser.parse(["--no-color"]).unwrap().get_str("no_color"),
            Some("never")
        );
    }

    #[test]
    fn test_render_help_lists_options() {
        let schema = Schema::new()
            .with("bool", true)
            .with_help("bool", "description of argument")
            .with("int", 12)
            .with_class("int", ValueKind::Integer);
        let help = compile(&schema).render_help();
        assert!(help.contains("Usage: test"), "{help}");
        assert!(help.contains("--bool"), "{help}");
        assert!(help.contains("--no-bool"), "{help}");
        assert!(help.contains("--int <ARG>"), "{help}");
        assert!(help.contains("description of argument (Default: true)"), "{help}");
        assert!(help.contains("-h, --help"), "{help}");
    }

    #[test]
    fn test_help_flag_can_be_suppressed() {
        let parser = OptionParser::compile(
            &Schema::new().with("host", "localhost").with_short("host", "h"),
            &GeneratorOptions::new().without_help().with_program_name("test"),
        )
        .unwrap();
        assert!(!parser.render_help().contains("--help"));
        let err = parser.parse(["--help"]).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }), "{err}");
        assert_eq!(
            parser.parse(["-h", "example.org"]).unwrap().get_str("host"),
            Some("example.org")
        );
    }

    #[test]
    fn test_parse_in_place_keeps_args_on_error() {
        let parser = compile(&Schema::new().with("int", 1));
        let mut args = vec!["a".to_string(), "--int=x".to_string()];
        assert!(parser.parse_in_place(&mut args).is_err());
        assert_eq!(args, vec!["a", "--int=x"]);
    }
}
