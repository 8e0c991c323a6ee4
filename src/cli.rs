use std::{collections::HashMap, path::PathBuf, process, time::Duration};

use config_bindr::{Bind, BindError, format_bind_error, print_usage, read_config, write_docs};
use serde::Deserialize;

#[derive(Bind, Deserialize, Default, Debug)]
#[serde(default)]
pub struct DemoConfig {
    /// Name reported in the greeting
    #[field(env = "NAME", default = "world")]
    pub name: String,

    #[field(env = "PORT,LISTEN_PORT", default = 8080, required, doc = "Port to listen on")]
    pub port: u16,

    #[field(env = "TIMEOUT", default = "30s", doc = "Request timeout")]
    pub timeout: Duration,

    #[field(env = "TAGS", separator = ";", doc = "Semicolon separated tags")]
    pub tags: Vec<String>,

    #[field(env = "LABELS", doc = "Comma separated key:value labels")]
    pub labels: HashMap<String, String>,

    #[field(nested, prefix = "DB_")]
    pub database: DemoDatabase,
}

#[derive(Bind, Deserialize, Default, Debug)]
#[serde(default)]
pub struct DemoDatabase {
    #[field(env = "URL", doc = "Database connection string")]
    pub url: String,

    #[field(env = "POOL", default = 4, doc = "Connection pool size")]
    pub pool: u32,
}

fn main() {
    dotenvy::from_filename("./test.env").ok();

    let file = std::env::var_os("DEMO_CONFIG_FILE").map(PathBuf::from);
    let mut config = DemoConfig::default();

    if let Err(err) = read_config(file.as_deref(), "demo", &mut config) {
        match err {
            BindError::Flags(err) => err.exit(),
            err => {
                eprintln!("{}", format_bind_error(&err));
                print_usage(&mut DemoConfig::default(), None).ok();
                process::exit(1);
            }
        }
    }

    println!("Config loaded successfully!");
    println!("  name: {}", config.name);
    println!("  port: {}", config.port);
    println!("  timeout: {:?}", config.timeout);
    println!("  tags: {:?}", config.tags);
    println!("  labels: {:?}", config.labels);
    println!("  database.url: {}", config.database.url);
    println!("  database.pool: {}", config.database.pool);

    if let Some(path) = std::env::var_os("DEMO_DOCS") {
        match write_docs(&mut DemoConfig::default(), "demo", &path) {
            Ok(_) => println!("✓ Documentation written to {}", PathBuf::from(path).display()),
            Err(e) => eprintln!("✗ Failed to write documentation: {}", e),
        }
    }
}
