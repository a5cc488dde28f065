//! Compile a defaults-with-metadata [`Schema`] into a command-line parser.
//!
//! Every primary key of the schema becomes an option:
//!
//! - Boolean defaults become negatable switches `--[no-]<name>`. A key
//!   starting with `no_` drops the prefix from the flag and stores the
//!   inverted switch state.
//! - Every other default becomes `--<name>=ARG`, coerced to the default's
//!   [`ValueKind`] (or the `__class` override) and checked against the
//!   `__values` allow-list.
//!
//! Underscores in keys become dashes in flag names. Meta keys (`__help`,
//! `__short`, `__values`, `__class`, `__proc`, `__required`) configure the
//! option they are attached to and never become flags themselves.
//!
//! Tokenizing, abbreviation matching and usage rendering are delegated to
//! [`clap`].
//!
//! # Example
//!
//! ```
//! use optparse_gen::{generate, GeneratorOptions};
//! use optparse_gen_core::Schema;
//!
//! let schema = Schema::new()
//!     .with("no_filter", true)
//!     .with_help("no_filter", "skip filtering")
//!     .with("level", 2)
//!     .with_values("level", vec![1, 2, 3])
//!     .with("name", "world")
//!     .with_short("name", "n");
//!
//! let parser = generate(&schema, &GeneratorOptions::default()).unwrap();
//! let values = parser.parse(["--filter", "--lev", "3", "-n", "rust"]).unwrap();
//!
//! assert_eq!(values.get_bool("no_filter"), Some(false));
//! assert_eq!(values.get_i64("level"), Some(3));
//! assert_eq!(values.get_str("name"), Some("rust"));
//! ```
//!
//! [`Schema`]: optparse_gen_core::Schema
//! [`ValueKind`]: optparse_gen_core::ValueKind

mod compile;
mod config;
mod error;
mod option;
mod parser;
mod validate;
mod value_parser;

pub use config::GeneratorOptions;
pub use error::{Error, Result};
pub use option::{CompiledOption, OptionKind, OptionSummary};
pub use parser::OptionParser;
pub use value_parser::{CoercingParser, Rejection};

use optparse_gen_core::{OptionValues, Schema};

/// Compiles `schema` into a reusable parser.
///
/// # Errors
///
/// See [`OptionParser::compile`].
pub fn generate(schema: &Schema, settings: &GeneratorOptions) -> Result<OptionParser> {
    OptionParser::compile(schema, settings)
}

/// Compiles `schema` and parses `args` once.
///
/// # Examples
///
/// ```
/// use optparse_gen::GeneratorOptions;
/// use optparse_gen_core::Schema;
///
/// let schema = Schema::new().with("dry_run", false);
/// let values = optparse_gen::parse(&schema, ["--dry-run"], &GeneratorOptions::default()).unwrap();
/// assert_eq!(values.get_bool("dry_run"), Some(true));
/// ```
pub fn parse<I, T>(schema: &Schema, args: I, settings: &GeneratorOptions) -> Result<OptionValues>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    generate(schema, settings)?.parse(args)
}

/// Compiles `schema` and parses `args` once, leaving only operands in `args`.
pub fn parse_in_place(
    schema: &Schema,
    args: &mut Vec<String>,
    settings: &GeneratorOptions,
) -> Result<OptionValues> {
    generate(schema, settings)?.parse_in_place(args)
}
