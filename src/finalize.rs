use tracing::trace;

use crate::{error::BindError, field::Descriptor};

/// Apply declared defaults and enforce required fields.
///
/// A field counts as unset when no source supplied it during this bind and it
/// still holds its zero value. Unset fields take their default literal; an
/// unset required field that is still zero afterwards is an error.
pub(crate) fn finalize(descriptors: &mut [Descriptor<'_>]) -> Result<(), BindError> {
    for descriptor in descriptors.iter_mut() {
        if descriptor.supplied() || !descriptor.is_zero() {
            continue;
        }

        if let Some(default) = descriptor.default {
            trace!(field = descriptor.field, "applying default value");
            descriptor.write(default)?;
        }

        if descriptor.required && descriptor.is_zero() {
            return Err(BindError::RequiredValueMissing {
                field: descriptor.field.to_string(),
                keys: descriptor.keys.clone(),
            });
        }
    }

    Ok(())
}
