use std::{collections::HashSet, ffi::OsString};

use clap::{Arg, ArgAction, Command};
use tracing::debug;

use crate::{error::BindError, field::Descriptor};

/// Flag name for a field: the first key, lower-cased with `_` turned into `-`,
/// or the lower-cased field name when the field has no keys.
pub fn flag_name(field: &str, keys: &[String]) -> String {
    match keys.first() {
        Some(key) => key.to_lowercase().replace('_', "-"),
        None => field.to_lowercase(),
    }
}

/// Build a command with one `--flag` per descriptor.
///
/// Returns the command and, per descriptor, the id of its flag. A name that
/// was already taken is dropped silently, so that descriptor gets `None` and
/// can't be set from the command line.
pub(crate) fn command(descriptors: &[Descriptor<'_>], help: Option<String>) -> (Command, Vec<Option<String>>) {
    let mut cmd = Command::new("config");
    if let Some(text) = help {
        cmd = cmd.after_help(text);
    }

    let mut taken: HashSet<String> = HashSet::from(["help".to_string()]);
    let mut ids = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        let name = flag_name(descriptor.field, &descriptor.keys);
        if !taken.insert(name.clone()) {
            debug!(flag = %name, field = descriptor.field, "flag name already registered, skipping");
            ids.push(None);
            continue;
        }

        cmd = cmd.arg(
            Arg::new(name.clone())
                .long(name.clone())
                .value_name("VALUE")
                .help(descriptor.description)
                .action(ArgAction::Set)
                .num_args(1),
        );
        ids.push(Some(name));
    }

    (cmd, ids)
}

/// Parse `args` (binary name first) against the synthesised flags and apply
/// every non-empty value.
pub(crate) fn apply_flags<I, T>(
    descriptors: &mut [Descriptor<'_>],
    args: I,
    help: Option<String>,
) -> Result<(), BindError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let (cmd, ids) = command(descriptors, help);
    let matches = cmd.try_get_matches_from(args)?;

    for (descriptor, id) in descriptors.iter_mut().zip(ids) {
        let Some(id) = id else {
            continue;
        };
        let Some(raw) = matches.get_one::<String>(&id) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        debug!(flag = %id, field = descriptor.field, "binding command-line flag");
        descriptor.apply(raw)?;
    }

    Ok(())
}
