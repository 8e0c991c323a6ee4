use std::ffi::OsString;

use tracing::debug;

use crate::{error::BindError, field::Descriptor};

/// Normalise an application name into an environment prefix.
///
/// A non-empty name is upper-cased and gets a trailing `_` if it lacks one.
pub fn to_prefix(app: &str) -> String {
    if app.is_empty() {
        return String::new();
    }
    let mut prefix = app.to_uppercase();
    if !prefix.ends_with('_') {
        prefix.push('_');
    }
    prefix
}

/// Look a variable up in the process environment
pub fn process_env(name: &str) -> Option<OsString> {
    std::env::var_os(name)
}

/// Apply environment values to every descriptor that has a matching key.
///
/// For each descriptor the keys are tried in order with `prefix` prepended and
/// the first hit wins. Descriptors without a hit are left untouched; a hit
/// that is not valid unicode is a coercion error.
pub(crate) fn apply_env<F>(descriptors: &mut [Descriptor<'_>], prefix: &str, lookup: F) -> Result<(), BindError>
where
    F: Fn(&str) -> Option<OsString>,
{
    for descriptor in descriptors.iter_mut() {
        let hit = descriptor.keys.iter().find_map(|key| {
            let name = format!("{prefix}{key}");
            lookup(&name).map(|raw| (name, raw))
        });

        let Some((name, raw)) = hit else {
            continue;
        };

        let raw = raw.into_string().map_err(|raw| {
            BindError::coercion(&raw.to_string_lossy(), descriptor.kind.clone(), "value is not valid unicode")
                .in_field(descriptor.field)
        })?;

        debug!(variable = %name, field = descriptor.field, "binding environment variable");
        descriptor.apply(&raw)?;
    }

    Ok(())
}
