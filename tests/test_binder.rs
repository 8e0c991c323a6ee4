use config_bindr::{Bind, BindError, Binder, format_bind_error, write_docs};
use serde::Deserialize;
use std::{collections::HashMap, io::Write, time::Duration};
use tempfile::NamedTempFile;

#[derive(Bind, Deserialize, Default, Debug)]
#[serde(default)]
pub struct AppConfig {
    #[field(env = "NAME", default = "app", doc = "Service name")]
    pub name: String,

    #[field(env = "WORKERS", default = 4, required, doc = "Worker threads")]
    pub workers: u32,

    #[field(env = "TIMEOUT", doc = "Request timeout")]
    #[serde(with = "humantime_serde_compat")]
    pub timeout: Duration,

    #[field(env = "LABELS", separator = ";")]
    pub labels: HashMap<String, String>,

    #[field(nested, prefix = "DB_")]
    pub db: DbConfig,
}

#[derive(Bind, Deserialize, Default, Debug)]
#[serde(default)]
pub struct DbConfig {
    #[field(env = "URL", required, doc = "Connection string")]
    pub url: String,

    #[field(env = "MAX_CONNS,POOL")]
    pub max_conns: u32,
}

// Durations in files are written the same way as in the environment
mod humantime_serde_compat {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + 'static {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file_then_environment() {
    let file = write_temp(
        ".toml",
        "name = \"from-file\"\ntimeout = \"2m\"\n\n[db]\nurl = \"postgres://file\"\nmax_conns = 10\n",
    );

    let mut cfg = AppConfig::default();
    Binder::new("svc")
        .file(file.path())
        .env_lookup(env(&[("SVC_DB_POOL", "20"), ("SVC_LABELS", "team:core;tier:1")]))
        .args(["svc"])
        .bind(&mut cfg)
        .unwrap();

    assert_eq!(cfg.name, "from-file");
    assert_eq!(cfg.workers, 4);
    assert_eq!(cfg.timeout, Duration::from_secs(120));
    assert_eq!(cfg.db.url, "postgres://file");
    assert_eq!(cfg.db.max_conns, 20);
    assert_eq!(cfg.labels.get("tier").map(String::as_str), Some("1"));
}

#[test]
fn test_json_file_then_flags() {
    let file = write_temp(".json", r#"{"workers": 8, "db": {"url": "postgres://json"}}"#);

    let mut cfg = AppConfig::default();
    Binder::new("svc")
        .file(file.path())
        .env_lookup(env(&[("SVC_WORKERS", "16")]))
        .args(["svc", "--workers", "32", "--timeout=1h30m", "--db-url", "postgres://flag"])
        .bind(&mut cfg)
        .unwrap();

    assert_eq!(cfg.workers, 32);
    assert_eq!(cfg.timeout, Duration::from_secs(5400));
    assert_eq!(cfg.db.url, "postgres://flag");
    assert_eq!(cfg.name, "app");
}

#[test]
fn test_dotenv_file_feeds_environment_pass() {
    let file = write_temp(".env", "BINDER_DOTENV_DB_URL=postgres://dotenv\nBINDER_DOTENV_WORKERS=0x10\n");

    let mut cfg = AppConfig::default();
    Binder::new("binder_dotenv")
        .file(file.path())
        .args(["svc"])
        .bind(&mut cfg)
        .unwrap();

    assert_eq!(cfg.db.url, "postgres://dotenv");
    assert_eq!(cfg.workers, 16);
}

#[test]
fn test_required_nested_field_reports_keys() {
    let mut cfg = AppConfig::default();
    let err = Binder::new("svc")
        .env_lookup(env(&[]))
        .no_flags()
        .bind_env(&mut cfg)
        .unwrap_err();

    match &err {
        BindError::RequiredValueMissing { field, keys } => {
            assert_eq!(field, "url");
            assert_eq!(keys, &vec!["DB_URL".to_string()]);
        }
        _ => panic!("Expected RequiredValueMissing error"),
    }

    colored::control::set_override(false);
    let report = format_bind_error(&err);
    assert!(report.contains("url: Is required but no value was provided"));
}

#[test]
fn test_bad_flag_value_is_reported_with_field() {
    let mut cfg = AppConfig::default();
    let err = Binder::new("svc")
        .env_lookup(env(&[("SVC_DB_URL", "postgres://env")]))
        .args(["svc", "--workers", "many"])
        .bind(&mut cfg)
        .unwrap_err();

    match err {
        BindError::Coercion { field, raw, target, .. } => {
            assert_eq!(field.as_deref(), Some("workers"));
            assert_eq!(raw, "many");
            assert_eq!(target, "u32");
        }
        _ => panic!("Expected Coercion error"),
    }
}

#[test]
fn test_malformed_map_entry() {
    let mut cfg = AppConfig::default();
    let err = Binder::new("svc")
        .env_lookup(env(&[("SVC_LABELS", "team:core;orphan")]))
        .bind_env(&mut cfg)
        .unwrap_err();

    assert!(matches!(err, BindError::Coercion { .. }));
}

#[test]
fn test_write_docs_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CONFIG.md");

    write_docs(&mut AppConfig::default(), "svc", &path).unwrap();

    let md = std::fs::read_to_string(&path).unwrap();
    assert!(md.contains("| `SVC_WORKERS` | u32 | Yes | Worker threads | 4 |"));
    assert!(md.contains("| `SVC_DB_MAX_CONNS`, `SVC_DB_POOL` | u32 | No |  | - |"));
}
