use chrono::{DateTime, Locale, Utc};

use crate::error::{AppError, Result};

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// `seconds * 1000 + nanoseconds / 1_000_000`, checked.
pub fn epoch_millis(seconds: i64, nanoseconds: i64) -> Result<i64> {
    if !(0..NANOS_PER_SECOND).contains(&nanoseconds) {
        return Err(AppError::InvalidTimestamp(format!(
            "nanoseconds out of range: {}",
            nanoseconds
        )));
    }

    seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(nanoseconds / NANOS_PER_MILLI))
        .ok_or_else(|| AppError::InvalidTimestamp(format!("seconds out of range: {}", seconds)))
}

/// Render a split-epoch timestamp as the locale's short date.
///
/// Dates are computed in UTC so the same record always renders the same
/// string regardless of where the process runs.
pub fn normalize_timestamp(
    seconds: Option<i64>,
    nanoseconds: Option<i64>,
    locale: &str,
) -> Result<String> {
    let seconds =
        seconds.ok_or_else(|| AppError::InvalidTimestamp("missing seconds".to_string()))?;
    let nanoseconds =
        nanoseconds.ok_or_else(|| AppError::InvalidTimestamp("missing nanoseconds".to_string()))?;

    let millis = epoch_millis(seconds, nanoseconds)?;
    let date = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        AppError::InvalidTimestamp(format!("outside the calendar range: {}ms", millis))
    })?;

    Ok(date.format_localized("%x", resolve_locale(locale)).to_string())
}

/// Accepts BCP 47 style tags (`en-US`) as well as POSIX names (`en_US`).
pub fn resolve_locale(tag: &str) -> Locale {
    let name = tag.trim().replace('-', "_");
    match Locale::try_from(name.as_str()) {
        Ok(locale) => locale,
        Err(_) => {
            tracing::warn!("Unknown locale {:?}, falling back to en_US", tag);
            Locale::en_US
        }
    }
}
