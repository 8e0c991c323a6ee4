use std::fmt;

use crate::{
    error::BindError,
    value::{DEFAULT_SEPARATOR, FieldValue, Kind, Rules},
};

/// Annotation data attached to one struct field by `#[derive(Bind)]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSpec {
    /// Rust field name
    pub name: &'static str,
    /// Comma separated list of source keys, tried in order
    pub env: Option<&'static str>,
    /// Raw literal applied when no source provided a value
    pub default: Option<&'static str>,
    /// Timestamp layout
    pub layout: Option<&'static str>,
    /// List and map separator, `,` when unset
    pub separator: Option<&'static str>,
    /// Human-readable description of what this config does
    pub description: &'static str,
    /// Whether the field must end up holding a value
    pub required: bool,
}

/// Binding metadata for one leaf field, pointing at the live value it controls
pub struct Descriptor<'a> {
    pub field: &'static str,
    /// Source keys with the nesting prefix applied, first match wins
    pub keys: Vec<String>,
    pub kind: Kind,
    pub default: Option<&'static str>,
    pub layout: Option<&'static str>,
    pub separator: &'static str,
    pub description: &'static str,
    pub required: bool,
    supplied: bool,
    target: &'a mut dyn FieldValue,
}

impl<'a> Descriptor<'a> {
    pub fn new(spec: FieldSpec, prefix: &str, kind: Kind, target: &'a mut dyn FieldValue) -> Self {
        let keys = spec
            .env
            .map(|list| {
                list.split(DEFAULT_SEPARATOR)
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(|key| format!("{prefix}{key}"))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            field: spec.name,
            keys,
            kind,
            default: spec.default,
            layout: spec.layout,
            separator: spec.separator.unwrap_or(DEFAULT_SEPARATOR),
            description: spec.description,
            required: spec.required,
            supplied: false,
            target,
        }
    }

    fn rules(&self) -> Rules<'static> {
        Rules {
            separator: self.separator,
            layout: self.layout,
        }
    }

    /// Coerce a value handed in by a configuration source into the field
    pub fn apply(&mut self, raw: &str) -> Result<(), BindError> {
        self.write(raw)?;
        self.supplied = true;
        Ok(())
    }

    pub(crate) fn write(&mut self, raw: &str) -> Result<(), BindError> {
        let rules = self.rules();
        self.target.set(raw, &rules).map_err(|err| err.in_field(self.field))
    }

    /// Whether a source has written this field during the current bind
    pub fn supplied(&self) -> bool {
        self.supplied
    }

    pub fn is_zero(&self) -> bool {
        self.target.is_zero()
    }
}

impl fmt::Debug for Descriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("field", &self.field)
            .field("keys", &self.keys)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("layout", &self.layout)
            .field("separator", &self.separator)
            .field("required", &self.required)
            .field("supplied", &self.supplied)
            .finish_non_exhaustive()
    }
}
