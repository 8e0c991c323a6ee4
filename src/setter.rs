use std::fmt;

/// A type that takes over its own conversion from a raw configuration string.
///
/// Implementing `Setter` alone does nothing; declare the capability with
/// [`impl_setter!`](crate::impl_setter), which routes every coercion of the
/// type through [`Setter::set_value`], including when it appears as a list
/// element or map key/value.
///
/// # Example
/// ```rust
/// use config_bindr::{Setter, impl_setter};
///
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Level(String);
///
/// impl Setter for Level {
///     type Err = String;
///
///     fn set_value(&mut self, raw: &str) -> Result<(), String> {
///         if raw.is_empty() {
///             return Err("level can't be empty".to_string());
///         }
///         self.0 = raw.to_lowercase();
///         Ok(())
///     }
/// }
///
/// impl_setter!(Level);
/// ```
pub trait Setter {
    type Err: fmt::Display;

    fn set_value(&mut self, raw: &str) -> Result<(), Self::Err>;
}
