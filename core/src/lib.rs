//! Schema, value, and coercion types for defaults-driven option parsers.
//!
//! This crate defines the data model consumed by the `optparse-gen`
//! compiler:
//!
//! - [`Schema`]: an ordered mapping from option key to [`Entry`]: either a
//!   default [`Value`] or metadata attached through a [`MetaKey`] suffix
//!   (`__help`, `__short`, `__values`, `__class`, `__proc`, `__required`).
//! - [`Value`]: runtime values (booleans, integers, floats, strings,
//!   regular expressions, flat lists).
//! - [`ValueKind`]: the coercion target for textual arguments, with
//!   [`ValueKind::coerce`].
//! - [`Transform`]: a custom conversion replacing the built-in coercion.
//! - [`OptionValues`]: the ordered result mapping of a parse.
//!
//! Schemas can be built in code or ingested from JSON ([`Schema::from_json_str`]).
//!
//! # Example
//!
//! ```
//! use optparse_gen_core::*;
//!
//! let schema = Schema::new()
//!     .with("bool", true)
//!     .with_help("bool", "description of argument")
//!     .with_short("bool", "b")
//!     .with("int", 12)
//!     .with_values("int", vec![1, 2, 12]);
//!
//! assert!(MetaKey::is_meta("bool__short"));
//! assert_eq!(schema.defaults().get_bool("bool"), Some(true));
//! assert_eq!(ValueKind::Integer.coerce("11").unwrap(), Value::Integer(11));
//! ```

mod coerce;
mod error;
mod schema;
mod types;
mod values;

pub use error::{CoercionError, SchemaError};
pub use schema::{Entry, MetaKey, RawValue, Schema, Transform};
pub use types::{Pattern, Value, ValueKind};
pub use values::OptionValues;
