//! Flag-name uniqueness across compiled options.

use std::collections::{HashMap, HashSet};

use crate::option::CompiledOption;
use crate::{Error, Result};

const HELP_LONG: &str = "help";
const HELP_SHORT: char = 'h';

/// Checks that no two options register the same long or short flag, and that
/// none shadows `--help`/`-h` while the help flag is generated.
///
/// Two booleans sharing a trigger because of an ignored `no_` collision
/// register one flag pair between them and are not duplicates.
pub(crate) fn validate_options(options: &[CompiledOption], help_flag: bool) -> Result<()> {
    let mut longs: HashMap<String, &CompiledOption> = HashMap::new();
    let mut shorts: HashSet<char> = HashSet::new();

    if help_flag {
        shorts.insert(HELP_SHORT);
    }

    for option in options {
        for long in option.long_names() {
            if help_flag && long == HELP_LONG {
                return Err(duplicate_long(&long));
            }
            match longs.get(&long) {
                Some(owner) if shares_flags(owner, option) => {}
                Some(_) => return Err(duplicate_long(&long)),
                None => {
                    longs.insert(long, option);
                }
            }
        }

        if let Some(short) = option.short {
            if !shorts.insert(short) {
                return Err(Error::DuplicateFlag {
                    flag: format!("-{short}"),
                });
            }
        }
    }

    Ok(())
}

/// Returns `true` for the boolean pair left behind by an ignored collision.
pub(crate) fn shares_flags(a: &CompiledOption, b: &CompiledOption) -> bool {
    use crate::option::OptionKind::Boolean;

    match (&a.kind, &b.kind) {
        (Boolean { inverted: x }, Boolean { inverted: y }) => a.trigger == b.trigger && (*x || *y),
        _ => false,
    }
}

fn duplicate_long(long: &str) -> Error {
    Error::DuplicateFlag {
        flag: format!("--{long}"),
    }
}
