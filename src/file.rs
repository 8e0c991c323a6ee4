use std::{any, fs, path::Path};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::BindError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
    /// `KEY=value` lines exported into the process environment
    Dotenv,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.file_name().is_some_and(|name| name == ".env") {
            return Some(Format::Dotenv);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Format::Yaml),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "env" => Some(Format::Dotenv),
            _ => None,
        }
    }
}

fn read(path: &Path) -> Result<String, BindError> {
    fs::read_to_string(path).map_err(|source| BindError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_dotenv(path: &Path) -> Result<(), BindError> {
    dotenvy::from_path_override(path).map_err(|err| match err {
        dotenvy::Error::Io(source) => BindError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => parse_error(path, other),
    })
}

fn parse_error(path: &Path, err: impl ToString) -> BindError {
    BindError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn not_a_record<T>(path: &Path, found: &str) -> BindError {
    BindError::Schema {
        type_name: any::type_name::<T>().to_string(),
        reason: format!("document root in {} is {found}, expected a mapping", path.display()),
    }
}

/// Load `path` into `cfg`.
///
/// Structured formats replace `cfg` with the deserialised document, so
/// fields missing from the file need `#[serde(default)]`. A dotenv file
/// leaves `cfg` alone and exports its variables, overriding existing ones,
/// for the environment pass that follows.
pub fn load_file<T: DeserializeOwned>(path: &Path, cfg: &mut T) -> Result<(), BindError> {
    let format = Format::from_path(path).ok_or_else(|| BindError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    debug!(path = %path.display(), ?format, "loading configuration file");

    *cfg = match format {
        Format::Dotenv => return load_dotenv(path),
        Format::Yaml => {
            let doc: serde_yaml::Value = serde_yaml::from_str(&read(path)?).map_err(|err| parse_error(path, err))?;
            if !doc.is_mapping() {
                return Err(not_a_record::<T>(path, yaml_shape(&doc)));
            }
            serde_yaml::from_value(doc).map_err(|err| parse_error(path, err))?
        }
        Format::Json => {
            let doc: serde_json::Value = serde_json::from_str(&read(path)?).map_err(|err| parse_error(path, err))?;
            if !doc.is_object() {
                return Err(not_a_record::<T>(path, json_shape(&doc)));
            }
            serde_json::from_value(doc).map_err(|err| parse_error(path, err))?
        }
        Format::Toml => toml::from_str(&read(path)?).map_err(|err| parse_error(path, err))?,
    };

    Ok(())
}

fn yaml_shape(doc: &serde_yaml::Value) -> &'static str {
    match doc {
        serde_yaml::Value::Null => "empty",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn json_shape(doc: &serde_json::Value) -> &'static str {
    match doc {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
