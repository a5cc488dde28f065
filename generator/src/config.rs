//! Compile-time settings for the option parser generator.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "ignore_collisions": true,
//!   "generate_no_help": false,
//!   "program_name": "mytool",
//!   "about": "Does things"
//! }
//! ```
//!
//! Every field is optional and defaults to off / unset.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Settings that apply to a whole compiled parser rather than one option.
///
/// # Examples
///
/// ```
/// use optparse_gen::GeneratorOptions;
///
/// let options = GeneratorOptions::new()
///     .with_ignore_collisions(true)
///     .with_program_name("tool");
/// assert!(options.ignore_collisions);
/// assert!(!options.generate_no_help);
/// assert_eq!(options.resolved_program_name(), "tool");
///
/// let parsed: GeneratorOptions = serde_json::from_str(r#"{"generate_no_help": true}"#).unwrap();
/// assert!(parsed.generate_no_help);
/// assert!(!parsed.ignore_collisions);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Let a `no_<name>` boolean coexist with a `<name>` boolean instead of
    /// failing with [`OptionCollision`](crate::Error::OptionCollision).
    pub ignore_collisions: bool,
    /// Do not register the automatic `-h/--help` flag.
    pub generate_no_help: bool,
    /// Program name shown in usage text. Defaults to the basename of the
    /// running executable.
    pub program_name: Option<String>,
    /// Text shown above the option list.
    pub about: Option<String>,
}

impl GeneratorOptions {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets collision-ignoring mode.
    pub fn with_ignore_collisions(mut self, ignore: bool) -> Self {
        self.ignore_collisions = ignore;
        self
    }

    /// Suppresses the automatic help flag.
    pub fn without_help(mut self) -> Self {
        self.generate_no_help = true;
        self
    }

    /// Sets the program name used in usage text.
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Sets the description shown above the option list.
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Returns the configured program name, falling back to the basename of
    /// the running executable.
    pub fn resolved_program_name(&self) -> String {
        if let Some(name) = &self.program_name {
            return name.clone();
        }
        std::env::args_os()
            .next()
            .and_then(|arg0| {
                Path::new(&arg0)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "program".to_string())
    }
}
