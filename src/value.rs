//! Conversion of raw strings into typed field values.
//!
//! Every bindable field type implements [`FieldValue`]. Scalars parse
//! themselves, while `Vec`, `HashMap` and `BTreeMap` split the raw string on
//! the active separator and coerce each piece through the element type's own
//! implementation, so nested shapes such as `Vec<Vec<u8>>` or
//! `HashMap<String, Vec<i32>>` fall out of the recursion.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    path::PathBuf,
    time::Duration,
};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::{error::BindError, literal};

/// Separator used for lists and maps when a field does not declare one
pub const DEFAULT_SEPARATOR: &str = ",";

/// Separator between a map entry's key and value
pub const MAP_KEY_SEPARATOR: char = ':';

/// Shape classification of a bindable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    /// Signed integer of the given bit width
    Int(u32),
    /// Unsigned integer of the given bit width
    Uint(u32),
    /// Floating point number of the given bit width
    Float(u32),
    String,
    Path,
    Duration,
    Timestamp,
    /// Raw byte sequence, never split on the separator
    Bytes,
    Seq(Box<Kind>),
    Map(Box<Kind>, Box<Kind>),
    /// A type that parses itself through [`Setter`](crate::Setter)
    Custom(&'static str),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int(bits) => write!(f, "i{bits}"),
            Kind::Uint(bits) => write!(f, "u{bits}"),
            Kind::Float(bits) => write!(f, "f{bits}"),
            Kind::String => write!(f, "string"),
            Kind::Path => write!(f, "path"),
            Kind::Duration => write!(f, "duration"),
            Kind::Timestamp => write!(f, "timestamp"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::Seq(elem) => write!(f, "list<{elem}>"),
            Kind::Map(key, value) => write!(f, "map<{key},{value}>"),
            Kind::Custom(name) => {
                let (path, generics) = name.split_at(name.find('<').unwrap_or(name.len()));
                let short = path.rsplit("::").next().unwrap_or(path);
                write!(f, "{short}{generics}")
            }
        }
    }
}

/// Per-field parsing rules threaded through the recursion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules<'s> {
    pub separator: &'s str,
    pub layout: Option<&'s str>,
}

impl Default for Rules<'_> {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            layout: None,
        }
    }
}

/// A type that can be written from a raw configuration string
pub trait FieldValue {
    /// Classification used for help output and error messages
    fn kind() -> Kind
    where
        Self: Sized;

    /// Replace the current value with the one decoded from `raw`
    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError>;

    /// Whether the value is still the type's zero value
    fn is_zero(&self) -> bool;

    /// Classification of `Vec<Self>`
    #[doc(hidden)]
    fn seq_kind() -> Kind
    where
        Self: Sized,
    {
        Kind::Seq(Box::new(Self::kind()))
    }

    /// Decode `raw` into a sequence of `Self`
    #[doc(hidden)]
    fn set_seq(seq: &mut Vec<Self>, raw: &str, rules: &Rules<'_>) -> Result<(), BindError>
    where
        Self: Sized + Default,
    {
        let mut items = Vec::new();
        if !raw.trim().is_empty() {
            for part in split(raw, rules.separator) {
                let mut item = Self::default();
                item.set(part, rules)?;
                items.push(item);
            }
        }
        *seq = items;
        Ok(())
    }
}

/// Split on `separator`; an empty separator splits into single characters.
fn split<'r>(raw: &'r str, separator: &str) -> Vec<&'r str> {
    if separator.is_empty() {
        return raw
            .char_indices()
            .map(|(at, c)| &raw[at..at + c.len_utf8()])
            .collect();
    }
    raw.split(separator).collect()
}

/// Decode `raw` as `key:value` entries, calling `insert` for each pair in order.
fn parse_entries<K, V>(
    raw: &str,
    rules: &Rules<'_>,
    mut insert: impl FnMut(K, V),
) -> Result<(), BindError>
where
    K: FieldValue + Default,
    V: FieldValue + Default,
{
    if raw.trim().is_empty() {
        return Ok(());
    }
    for entry in split(raw, rules.separator) {
        let Some((raw_key, raw_value)) = entry.split_once(MAP_KEY_SEPARATOR) else {
            return Err(BindError::coercion(
                entry,
                Kind::Map(Box::new(K::kind()), Box::new(V::kind())),
                "invalid map item, expected key:value",
            ));
        };
        let mut key = K::default();
        key.set(raw_key, rules)?;
        let mut value = V::default();
        value.set(raw_value, rules)?;
        insert(key, value);
    }
    Ok(())
}

impl FieldValue for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        raw.clone_into(self);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl FieldValue for PathBuf {
    fn kind() -> Kind {
        Kind::Path
    }

    fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        *self = PathBuf::from(raw);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl FieldValue for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        *self = literal::parse_bool(raw).map_err(|reason| BindError::coercion(raw, Kind::Bool, reason))?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

macro_rules! signed_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FieldValue for $ty {
            fn kind() -> Kind {
                Kind::Int(<$ty>::BITS)
            }

            fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
                *self = literal::parse_signed(raw)
                    .map_err(|reason| BindError::coercion(raw, Self::kind(), reason))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

macro_rules! unsigned_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FieldValue for $ty {
            fn kind() -> Kind {
                Kind::Uint(<$ty>::BITS)
            }

            fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
                *self = literal::parse_unsigned(raw)
                    .map_err(|reason| BindError::coercion(raw, Self::kind(), reason))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

signed_value!(i8, i16, i32, i64, isize);
unsigned_value!(u16, u32, u64, usize);

// u8 stands alone: a Vec<u8> takes the raw bytes instead of splitting.
impl FieldValue for u8 {
    fn kind() -> Kind {
        Kind::Uint(8)
    }

    fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        *self = literal::parse_unsigned(raw).map_err(|reason| BindError::coercion(raw, Kind::Uint(8), reason))?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn seq_kind() -> Kind {
        Kind::Bytes
    }

    fn set_seq(seq: &mut Vec<Self>, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        *seq = raw.as_bytes().to_vec();
        Ok(())
    }
}

macro_rules! float_value {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl FieldValue for $ty {
            fn kind() -> Kind {
                Kind::Float($bits)
            }

            fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
                *self = raw
                    .parse::<$ty>()
                    .map_err(|err| BindError::coercion(raw, Self::kind(), err))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                self.to_bits() == 0
            }
        }
    )*};
}

float_value!(f32 => 32, f64 => 64);

impl FieldValue for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn set(&mut self, raw: &str, _rules: &Rules<'_>) -> Result<(), BindError> {
        *self = humantime::parse_duration(raw).map_err(|err| BindError::coercion(raw, Kind::Duration, err))?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == Duration::ZERO
    }
}

impl FieldValue for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        *self = literal::parse_timestamp(raw, rules.layout)
            .map_err(|err| BindError::coercion(raw, Kind::Timestamp, err))?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<FixedOffset>::default()
    }
}

impl FieldValue for DateTime<Utc> {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        let ts = literal::parse_timestamp(raw, rules.layout)
            .map_err(|err| BindError::coercion(raw, Kind::Timestamp, err))?;
        *self = ts.with_timezone(&Utc);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

impl FieldValue for NaiveDateTime {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        let ts = literal::parse_timestamp(raw, rules.layout)
            .map_err(|err| BindError::coercion(raw, Kind::Timestamp, err))?;
        *self = ts.naive_local();
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDateTime::default()
    }
}

impl FieldValue for NaiveDate {
    fn kind() -> Kind {
        Kind::Timestamp
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        *self = NaiveDate::parse_from_str(raw, rules.layout.unwrap_or("%Y-%m-%d"))
            .map_err(|err| BindError::coercion(raw, Kind::Timestamp, err))?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDate::default()
    }
}

impl<T: FieldValue + Default> FieldValue for Option<T> {
    fn kind() -> Kind {
        T::kind()
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        let mut value = T::default();
        value.set(raw, rules)?;
        *self = Some(value);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: FieldValue + Default> FieldValue for Vec<T> {
    fn kind() -> Kind {
        T::seq_kind()
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        T::set_seq(self, raw, rules)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> FieldValue for HashMap<K, V, S>
where
    K: FieldValue + Default + Eq + Hash,
    V: FieldValue + Default,
    S: BuildHasher + Default,
{
    fn kind() -> Kind {
        Kind::Map(Box::new(K::kind()), Box::new(V::kind()))
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        let mut map = HashMap::with_hasher(S::default());
        parse_entries(raw, rules, |key, value| {
            map.insert(key, value);
        })?;
        *self = map;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> FieldValue for BTreeMap<K, V>
where
    K: FieldValue + Default + Ord,
    V: FieldValue + Default,
{
    fn kind() -> Kind {
        Kind::Map(Box::new(K::kind()), Box::new(V::kind()))
    }

    fn set(&mut self, raw: &str, rules: &Rules<'_>) -> Result<(), BindError> {
        let mut map = BTreeMap::new();
        parse_entries(raw, rules, |key, value| {
            map.insert(key, value);
        })?;
        *self = map;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
