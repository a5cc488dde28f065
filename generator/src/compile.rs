//! Schema compilation: naming conventions and meta keys to option definitions.

use optparse_gen_core::{Entry, MetaKey, Schema, Transform, Value, ValueKind};
use tracing::{debug, warn};

use crate::option::{CompiledOption, OptionKind};
use crate::{Error, GeneratorOptions, Result};

/// A primary key with its derived trigger, before metadata is applied.
struct Primary<'a> {
    key: &'a str,
    default: &'a Value,
    trigger: String,
    inverted: bool,
}

/// Compiles every primary key of `schema` into an option, in schema order.
///
/// Runs the collision check but not flag uniqueness, which is checked by
/// [`validate_options`](crate::validate::validate_options) once all options
/// exist.
pub(crate) fn compile_options(
    schema: &Schema,
    options: &GeneratorOptions,
) -> Result<Vec<CompiledOption>> {
    for orphan in schema.orphan_meta_keys() {
        warn!(key = orphan, "meta key configures an option that does not exist");
    }

    let primaries = schema
        .primary_keys()
        .map(|key| primary(schema, key))
        .collect::<Result<Vec<_>>>()?;

    check_collisions(&primaries, options.ignore_collisions)?;

    primaries
        .iter()
        .map(|primary| compile_option(schema, primary))
        .collect()
}

fn primary<'a>(schema: &'a Schema, key: &'a str) -> Result<Primary<'a>> {
    let default = match schema.get(key) {
        Some(Entry::Value(value)) => value,
        Some(other) => {
            return Err(invalid_meta(
                key,
                format!("option default must be a value, found {}", other.type_name()),
            ));
        }
        None => return Err(invalid_meta(key, "option has no default")),
    };

    let (trigger, inverted) = derive_trigger(key, default.is_bool());
    if trigger.is_empty() {
        return Err(invalid_meta(key, "option name is empty"));
    }
    if trigger.starts_with('-') || trigger.contains(|c: char| c == '=' || c.is_whitespace()) {
        return Err(invalid_meta(key, format!("'--{trigger}' is not a usable flag name")));
    }

    Ok(Primary {
        key,
        default,
        trigger,
        inverted,
    })
}

/// Translates `_` to `-`; boolean keys starting with `no_` lose every leading
/// `no-` group and are marked inverted.
pub(crate) fn derive_trigger(key: &str, boolean: bool) -> (String, bool) {
    let mut trigger = key.replace('_', "-");
    if !boolean || !key.starts_with("no_") {
        return (trigger, false);
    }
    while let Some(rest) = trigger.strip_prefix("no-") {
        trigger = rest.to_string();
    }
    (trigger, true)
}

fn check_collisions(primaries: &[Primary<'_>], ignore: bool) -> Result<()> {
    for negated in primaries.iter().filter(|p| p.inverted) {
        let Some(other) = primaries
            .iter()
            .find(|p| p.key != negated.key && p.trigger == negated.trigger)
        else {
            continue;
        };

        if !ignore {
            return Err(Error::OptionCollision {
                key: negated.key.to_string(),
            });
        }
        if other.default.is_bool() {
            warn!(
                key = negated.key,
                other = other.key,
                trigger = %negated.trigger,
                "ignoring option collision, flags are shared"
            );
        }
        // A boolean sharing its trigger with a scalar surfaces as a
        // duplicate flag during validation.
    }
    Ok(())
}

fn compile_option(schema: &Schema, primary: &Primary<'_>) -> Result<CompiledOption> {
    let key = primary.key;
    let default = primary.default.clone();

    let help = match meta_value(schema, key, MetaKey::Help)? {
        Some(text) => format!("{text} (Default: {default})"),
        None => format!(" (Default: {default})"),
    };
    let short = read_short(schema, key)?;
    let transform = read_transform(schema, key)?;
    let required = read_required(schema, key)?;

    let kind = if default.is_bool() {
        OptionKind::Boolean {
            inverted: primary.inverted,
        }
    } else {
        OptionKind::Scalar {
            coercion: read_class(schema, key)?.unwrap_or_else(|| ValueKind::of(&default)),
            allowed: read_values(schema, key)?,
        }
    };

    let option = CompiledOption {
        key: key.to_string(),
        trigger: primary.trigger.clone(),
        kind,
        default,
        help,
        short,
        required,
        transform,
    };
    debug!(
        key = %option.key,
        switch = %option.switch(),
        short = ?option.short,
        required = option.required,
        "compiled option"
    );
    Ok(option)
}

fn meta_value<'a>(schema: &'a Schema, key: &str, meta: MetaKey) -> Result<Option<&'a Value>> {
    match schema.meta(key, meta) {
        None => Ok(None),
        Some(Entry::Value(value)) => Ok(Some(value)),
        Some(other) => Err(invalid_meta(
            &meta.key_for(key),
            format!("expected a value, found {}", other.type_name()),
        )),
    }
}

fn read_short(schema: &Schema, key: &str) -> Result<Option<char>> {
    let short = match meta_value(schema, key, MetaKey::Short)? {
        None => return Ok(None),
        Some(Value::String(short)) => short,
        Some(other) => {
            return Err(invalid_meta(
                &MetaKey::Short.key_for(key),
                format!("expected a string, found {}", ValueKind::of(other)),
            ));
        }
    };

    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) if c != '-' && c != '=' && !c.is_whitespace() => Ok(Some(c)),
        _ => Err(Error::InvalidShortFlag {
            key: key.to_string(),
            short: short.clone(),
        }),
    }
}

fn read_values(schema: &Schema, key: &str) -> Result<Option<Vec<Value>>> {
    match meta_value(schema, key, MetaKey::Values)? {
        None => Ok(None),
        Some(Value::List(values)) if values.is_empty() => Ok(None),
        Some(Value::List(values)) => Ok(Some(values.clone())),
        Some(other) => Err(invalid_meta(
            &MetaKey::Values.key_for(key),
            format!("expected a list, found {}", ValueKind::of(other)),
        )),
    }
}

fn read_class(schema: &Schema, key: &str) -> Result<Option<ValueKind>> {
    match schema.meta(key, MetaKey::Class) {
        None => Ok(None),
        Some(Entry::Kind(kind)) => Ok(Some(*kind)),
        Some(Entry::Value(Value::String(name))) => Ok(Some(name.parse()?)),
        Some(other) => Err(invalid_meta(
            &MetaKey::Class.key_for(key),
            format!("expected a value kind, found {}", other.type_name()),
        )),
    }
}

fn read_transform(schema: &Schema, key: &str) -> Result<Option<Transform>> {
    match schema.meta(key, MetaKey::Proc) {
        None => Ok(None),
        Some(Entry::Transform(transform)) => Ok(Some(transform.clone())),
        Some(other) => Err(invalid_meta(
            &MetaKey::Proc.key_for(key),
            format!("expected a transform, found {}", other.type_name()),
        )),
    }
}

fn read_required(schema: &Schema, key: &str) -> Result<bool> {
    match meta_value(schema, key, MetaKey::Required)? {
        None => Ok(false),
        Some(Value::Bool(required)) => Ok(*required),
        Some(other) => Err(invalid_meta(
            &MetaKey::Required.key_for(key),
            format!("expected a boolean, found {}", ValueKind::of(other)),
        )),
    }
}

fn invalid_meta(key: &str, reason: impl Into<String>) -> Error {
    Error::InvalidMeta {
        key: key.to_string(),
        reason: reason.into(),
    }
}
