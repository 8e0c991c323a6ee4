use colored::Colorize;
use std::{fs, io, path::Path};

use crate::{
    environment::to_prefix,
    field::Descriptor,
    introspect::{Bind, introspect},
};

/// Header used when the caller does not provide one
pub const DEFAULT_HEADER: &str = "Environment variables:";

pub(crate) fn render(descriptors: &[Descriptor<'_>], header: Option<&str>, styled: bool) -> String {
    let mut body = String::new();

    for descriptor in descriptors {
        let Some(primary) = descriptor.keys.first() else {
            continue;
        };

        for (idx, key) in descriptor.keys.iter().enumerate() {
            let name = if styled {
                key.magenta().bold().to_string()
            } else {
                key.clone()
            };
            body.push_str(&format!("\n  {name} {}", descriptor.kind));
            if idx > 0 {
                body.push_str(&format!(" (alternative to {primary})"));
            }
            body.push_str(&format!("\n    \t{}", descriptor.description));
            if let Some(default) = descriptor.default {
                body.push_str(&format!(" (default {default:?})"));
            }
        }
    }

    if body.is_empty() {
        return body;
    }

    let header = header.unwrap_or(DEFAULT_HEADER);
    if styled {
        format!("{}{body}", header.bold())
    } else {
        format!("{header}{body}")
    }
}

/// Describe every environment variable `cfg` can be bound from.
///
/// Each key gets its own entry with the field's kind and description;
/// alternative keys point back at the primary one. Returns an empty string
/// when no field has a key.
pub fn describe<T: Bind>(cfg: &mut T, header: Option<&str>) -> String {
    render(&introspect(cfg), header, false)
}

/// Write the binding description to `w`, styled when colours are enabled
pub fn write_usage<T: Bind, W: io::Write>(w: &mut W, cfg: &mut T, header: Option<&str>) -> io::Result<()> {
    let text = render(&introspect(cfg), header, true);
    writeln!(w, "{text}")
}

/// Print the binding description to stderr
pub fn print_usage<T: Bind>(cfg: &mut T, header: Option<&str>) -> io::Result<()> {
    write_usage(&mut io::stderr().lock(), cfg, header)
}

/// Write configuration documentation to a markdown file
///
/// Lists every environment variable, with the application prefix applied,
/// along with whether it is required, its description and its default.
///
/// # Example
/// ```no_run
/// use config_bindr::{Bind, write_docs};
///
/// #[derive(Bind, Default)]
/// pub struct Config {
///     #[field(env = "PORT", default = 8080, doc = "Server port")]
///     pub port: u16,
/// }
///
/// write_docs(&mut Config::default(), "myapp", "CONFIG.md").unwrap();
/// ```
pub fn write_docs<T: Bind>(cfg: &mut T, app: &str, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, markdown(&introspect(cfg), &to_prefix(app)))
}

fn markdown(descriptors: &[Descriptor<'_>], prefix: &str) -> String {
    let mut md = String::new();

    md.push_str("## Environment Variables Summary\n\n");
    md.push_str("| Variable | Type | Required | Description | Default |\n");
    md.push_str("|----------|------|----------|-------------|---------|\n");
    for descriptor in descriptors {
        if descriptor.keys.is_empty() {
            continue;
        }
        let variables = descriptor
            .keys
            .iter()
            .map(|key| format!("`{prefix}{key}`"))
            .collect::<Vec<_>>()
            .join(", ");
        let required_str = if descriptor.required { "Yes" } else { "No" };
        let default_display = descriptor.default.unwrap_or("-");
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            variables, descriptor.kind, required_str, descriptor.description, default_display
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::introspect::Introspector;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Config {
        port: u16,
        hosts: Vec<String>,
        labels: HashMap<String, String>,
        internal: bool,
    }

    impl Bind for Config {
        fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>) {
            let Self {
                port,
                hosts,
                labels,
                internal,
            } = self;
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "port",
                    env: Some("PORT,LISTEN_PORT"),
                    default: Some("8080"),
                    description: "Server port",
                    required: true,
                    ..FieldSpec::default()
                },
                port,
            );
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "hosts",
                    env: Some("HOSTS"),
                    description: "Upstream hosts",
                    ..FieldSpec::default()
                },
                hosts,
            );
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "labels",
                    env: Some("LABELS"),
                    description: "Extra labels",
                    ..FieldSpec::default()
                },
                labels,
            );
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "internal",
                    description: "Not bindable from the environment",
                    ..FieldSpec::default()
                },
                internal,
            );
        }
    }

    #[derive(Default)]
    struct Hidden {
        flag: bool,
    }

    impl Bind for Hidden {
        fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>) {
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "flag",
                    ..FieldSpec::default()
                },
                &mut self.flag,
            );
        }
    }

    #[test]
    fn test_describe_layout() {
        let text = describe(&mut Config::default(), None);

        let expected = "Environment variables:\
            \n  PORT u16\n    \tServer port (default \"8080\")\
            \n  LISTEN_PORT u16 (alternative to PORT)\n    \tServer port (default \"8080\")\
            \n  HOSTS list<string>\n    \tUpstream hosts\
            \n  LABELS map<string,string>\n    \tExtra labels";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_describe_custom_header() {
        let text = describe(&mut Config::default(), Some("My variables:"));
        assert!(text.starts_with("My variables:\n  PORT u16"));
    }

    #[test]
    fn test_describe_without_keys_is_empty() {
        assert_eq!(describe(&mut Hidden::default(), None), "");
    }

    #[test]
    fn test_write_usage_plain() {
        colored::control::set_override(false);

        let mut out = Vec::new();
        write_usage(&mut out, &mut Config::default(), Some("Config:")).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Config:\n  PORT u16"));
        assert!(text.ends_with("Extra labels\n"));
    }

    #[test]
    fn test_print_usage_reports_success() {
        assert!(print_usage(&mut Config::default(), None).is_ok());
        assert!(print_usage(&mut Hidden::default(), Some("Nothing:")).is_ok());
    }

    #[test]
    fn test_write_docs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CONFIG.md");

        write_docs(&mut Config::default(), "app", &path).unwrap();

        let md = std::fs::read_to_string(&path).unwrap();
        assert!(md.contains("## Environment Variables Summary"));
        assert!(md.contains("| `APP_PORT`, `APP_LISTEN_PORT` | u16 | Yes | Server port | 8080 |"));
        assert!(md.contains("| `APP_HOSTS` | list<string> | No | Upstream hosts | - |"));
        assert!(!md.contains("internal"));
    }
}
