use colored::Colorize;
use std::{fmt, path::PathBuf};
use thiserror::Error;

use crate::value::Kind;

/// Errors that can occur while binding configuration onto a struct
#[derive(Debug, Error)]
pub enum BindError {
    /// A value handed to the binder does not have the shape of a record
    #[error("{type_name} cannot be bound: {reason}")]
    Schema { type_name: String, reason: String },

    /// A raw string could not be converted into the field's declared type
    #[error("{}cannot convert {raw:?} to {target}: {reason}", field_label(.field))]
    Coercion {
        field: Option<String>,
        raw: String,
        target: String,
        reason: String,
    },

    /// A required field still holds its zero value after every source was applied
    #[error("field {field:?} is required but the value is not provided")]
    RequiredValueMissing { field: String, keys: Vec<String> },

    /// Reading a configuration file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A configuration file could not be parsed
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The configuration file extension is not one we know how to read
    #[error("unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Command-line flags could not be parsed (also carries `--help` output)
    #[error(transparent)]
    Flags(#[from] clap::Error),
}

fn field_label(field: &Option<String>) -> String {
    match field {
        Some(name) => format!("field {name:?}: "),
        None => String::new(),
    }
}

impl BindError {
    /// Build a coercion failure for `raw` against the `target` kind
    pub fn coercion(raw: &str, target: Kind, reason: impl fmt::Display) -> Self {
        BindError::Coercion {
            field: None,
            raw: raw.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Attach the field name to a coercion failure that does not carry one yet
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            BindError::Coercion {
                field: None,
                raw,
                target,
                reason,
            } => BindError::Coercion {
                field: Some(name.to_string()),
                raw,
                target,
                reason,
            },
            other => other,
        }
    }
}

/// Render a binding error into a human readable, coloured report
pub fn format_bind_error(error: &BindError) -> String {
    let mut out = format!("{}\n", "Configuration failed".yellow().bold());
    match error {
        BindError::RequiredValueMissing { field, keys } => {
            out.push_str(&format!(
                "  - {}: Is required but no value was provided\n",
                field.magenta().bold()
            ));
            if !keys.is_empty() {
                out.push_str(&format!("\tSources: {}\n", keys.join(", ").cyan()));
            }
        }
        BindError::Coercion {
            field,
            raw,
            target,
            reason,
        } => {
            let name = field.as_deref().unwrap_or("<value>");
            out.push_str(&format!(
                "  - {}: Invalid value {}\n",
                name.magenta().bold(),
                format!("'{raw}'").red()
            ));
            out.push_str(&format!("\tExpected: {target}\n\tReason: {reason}\n"));
        }
        other => out.push_str(&format!("  - {other}\n")),
    }
    out
}
