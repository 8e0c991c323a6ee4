//! Literal grammars shared by the built-in coercions.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse the conventional boolean spellings.
pub(crate) fn parse_bool(raw: &str) -> Result<bool, &'static str> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid syntax"),
    }
}

/// Split an integer literal into its sign and magnitude.
///
/// Accepts an optional sign, `0x`/`0o`/`0b` prefixes, a legacy leading `0`
/// for octal and `_` between digits.
fn parse_magnitude(raw: &str) -> Result<(bool, u128), &'static str> {
    let (negative, body) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    let digits = digits.strip_prefix('_').filter(|_| radix != 10).unwrap_or(digits);
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("invalid syntax");
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    let magnitude = u128::from_str_radix(&cleaned, radix).map_err(|_| "invalid syntax")?;
    Ok((negative, magnitude))
}

/// Parse a signed integer literal, range-checked against `T`.
pub(crate) fn parse_signed<T: TryFrom<i128>>(raw: &str) -> Result<T, &'static str> {
    let (negative, magnitude) = parse_magnitude(raw)?;
    let value = if negative {
        if magnitude > i128::MAX as u128 + 1 {
            return Err("value out of range");
        }
        (magnitude as i128).wrapping_neg()
    } else {
        i128::try_from(magnitude).map_err(|_| "value out of range")?
    };
    T::try_from(value).map_err(|_| "value out of range")
}

/// Parse an unsigned integer literal, range-checked against `T`.
pub(crate) fn parse_unsigned<T: TryFrom<u128>>(raw: &str) -> Result<T, &'static str> {
    if raw.starts_with(['-', '+']) {
        return Err("invalid syntax");
    }
    let (_, magnitude) = parse_magnitude(raw)?;
    T::try_from(magnitude).map_err(|_| "value out of range")
}

/// Parse a timestamp with a strftime layout, or RFC 3339 when no layout is set.
///
/// Layouts without an offset are read as UTC, and date-only layouts resolve to
/// midnight.
pub(crate) fn parse_timestamp(
    raw: &str,
    layout: Option<&str>,
) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let Some(layout) = layout else {
        return DateTime::parse_from_rfc3339(raw);
    };

    if let Ok(ts) = DateTime::parse_from_str(raw, layout) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, layout) {
        return Ok(ts.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, layout).map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
}
