use std::{ffi::OsString, path::{Path, PathBuf}};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    docs,
    environment::{apply_env, process_env, to_prefix},
    error::BindError,
    file::load_file,
    finalize::finalize,
    flags::apply_flags,
    introspect::{Bind, introspect},
};

type Lookup = Box<dyn Fn(&str) -> Option<OsString>>;

/// Binds configuration sources onto a struct in a fixed order: file,
/// environment, command-line flags, then defaults and required checks.
///
/// # Example
/// ```no_run
/// use config_bindr::{Bind, Binder};
/// use serde::Deserialize;
///
/// #[derive(Bind, Deserialize, Default)]
/// #[serde(default)]
/// pub struct Config {
///     #[field(env = "PORT", default = 8080, doc = "Server port")]
///     pub port: u16,
/// }
///
/// let mut cfg = Config::default();
/// Binder::new("myapp").file("config.yaml").bind(&mut cfg).unwrap();
/// ```
pub struct Binder {
    prefix: String,
    file: Option<PathBuf>,
    args: Option<Vec<OsString>>,
    lookup: Lookup,
    flags: bool,
}

impl Binder {
    /// Create a binder for `app`; every environment key gets `APP_` prepended
    pub fn new(app: &str) -> Self {
        Self {
            prefix: to_prefix(app),
            file: None,
            args: None,
            lookup: Box::new(process_env),
            flags: true,
        }
    }

    /// Load this file before any other source
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Parse these arguments instead of the process arguments.
    ///
    /// The first item is the binary name, as with `std::env::args_os`.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve environment variables through `lookup` instead of the process
    /// environment
    pub fn env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.lookup = Box::new(move |name: &str| lookup(name).map(OsString::from));
        self
    }

    /// Skip command-line flags entirely
    pub fn no_flags(mut self) -> Self {
        self.flags = false;
        self
    }

    /// Bind from the environment only, then apply defaults and required checks
    pub fn bind_env<T: Bind>(&self, cfg: &mut T) -> Result<(), BindError> {
        let mut descriptors = introspect(cfg);
        debug!(prefix = %self.prefix, fields = descriptors.len(), "binding environment");

        apply_env(&mut descriptors, &self.prefix, |name: &str| (self.lookup)(name))?;
        finalize(&mut descriptors)
    }

    /// Bind every configured source onto `cfg`.
    ///
    /// A structured file replaces `cfg` first; environment values and flags
    /// then override whatever the file set. `--help` comes back as
    /// [`BindError::Flags`] carrying the environment variable listing.
    pub fn bind<T: Bind + DeserializeOwned>(&self, cfg: &mut T) -> Result<(), BindError> {
        if let Some(path) = &self.file {
            load_file(path, cfg)?;
        }

        let mut descriptors = introspect(cfg);
        debug!(prefix = %self.prefix, fields = descriptors.len(), "binding configuration");

        apply_env(&mut descriptors, &self.prefix, |name: &str| (self.lookup)(name))?;

        if self.flags {
            let help = docs::render(&descriptors, None, false);
            let help = (!help.is_empty()).then_some(help);
            match &self.args {
                Some(args) => apply_flags(&mut descriptors, args.iter().cloned(), help)?,
                None => apply_flags(&mut descriptors, std::env::args_os(), help)?,
            }
        }

        finalize(&mut descriptors)
    }
}

/// Bind `cfg` from the process environment, with keys prefixed by `app`
pub fn read_env<T: Bind>(cfg: &mut T, app: &str) -> Result<(), BindError> {
    Binder::new(app).bind_env(cfg)
}

/// Bind `cfg` from an optional file, the process environment and the process
/// arguments, in that order
pub fn read_config<T: Bind + DeserializeOwned>(path: Option<&Path>, app: &str, cfg: &mut T) -> Result<(), BindError> {
    let mut binder = Binder::new(app);
    if let Some(path) = path {
        binder = binder.file(path);
    }
    binder.bind(cfg)
}
