//! Bind environment variables, command-line flags and configuration files
//! onto plain annotated structs.
//!
//! ```no_run
//! use config_bindr::{Bind, Load};
//!
//! #[derive(Bind, Default, Debug)]
//! pub struct Config {
//!     /// Address to listen on
//!     #[field(env = "LISTEN,ADDR", default = "0.0.0.0:8080")]
//!     pub listen: String,
//!
//!     #[field(env = "TIMEOUT", default = "30s", doc = "Request timeout")]
//!     pub timeout: std::time::Duration,
//!
//!     #[field(nested, prefix = "DB_")]
//!     pub db: Database,
//! }
//!
//! #[derive(Bind, Default, Debug)]
//! pub struct Database {
//!     #[field(env = "URL", required, doc = "Connection string")]
//!     pub url: String,
//! }
//!
//! // Reads MYAPP_LISTEN (or MYAPP_ADDR), MYAPP_TIMEOUT and MYAPP_DB_URL
//! let config = Config::load("myapp");
//! ```

extern crate self as config_bindr;

pub mod builder;
pub mod docs;
pub mod environment;
pub mod error;
pub mod field;
pub mod file;
mod finalize;
pub mod flags;
pub mod introspect;
mod literal;
pub mod macros;
pub mod setter;
pub mod value;

// Re-export main types
pub use builder::{Binder, read_config, read_env};
pub use docs::{describe, print_usage, write_docs, write_usage};
pub use environment::to_prefix;
pub use error::{BindError, format_bind_error};
pub use field::{Descriptor, FieldSpec};
pub use file::{Format, load_file};
pub use introspect::{Bind, Introspector, introspect};
pub use setter::Setter;
pub use value::{DEFAULT_SEPARATOR, FieldValue, Kind, Rules};

// Re-export macro
pub use config_bindr_macros::Bind;

/// Loading configuration straight from the environment
pub trait Load: Bind + Default {
    /// Load configuration from the environment, panicking on errors
    fn load(app: &str) -> Self {
        match Self::load_or_error(app) {
            Ok(cfg) => cfg,
            Err(err) => panic!("{}", format_bind_error(&err)),
        }
    }

    /// Load configuration from the environment, returning errors instead of panicking
    ///
    /// A `.env` file in the working directory is read first when present.
    fn load_or_error(app: &str) -> Result<Self, BindError> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        read_env(&mut cfg, app)?;
        Ok(cfg)
    }

    /// Describe the environment variables this type binds from
    fn describe(header: Option<&str>) -> String {
        docs::describe(&mut Self::default(), header)
    }
}

impl<T: Bind + Default> Load for T {}
