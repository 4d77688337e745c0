//! Timestamp normalization for `message.date` values.
//!
//! The store counts from the Cocoa epoch (2001-01-01T00:00:00Z). Older records
//! use seconds; newer ones use nanoseconds. Any magnitude above 1e15 is taken
//! to be nanoseconds.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

/// Seconds between 1970-01-01 and 2001-01-01.
pub const COCOA_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Raw magnitudes above this are nanoseconds.
pub const NANOSECOND_THRESHOLD: f64 = 1e15;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A normalized instant plus whether it had to be fabricated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: DateTime<Utc>,
    /// Set when the raw value was unusable and `date` is the time of normalization.
    pub estimated: bool,
}

/// Convert a raw floating value to a UTC instant.
///
/// Returns `None` for NaN, infinities, and values outside chrono's range.
pub fn try_normalize(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    let secs = if raw.abs() > NANOSECOND_THRESHOLD {
        raw / 1e9
    } else {
        raw
    };
    let unix = secs + COCOA_EPOCH_OFFSET_SECS as f64;
    let whole = unix.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = (((unix - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}

/// Convert a raw integer column value to a UTC instant without float rounding.
pub fn try_normalize_raw(raw: i64) -> Option<DateTime<Utc>> {
    let (secs, nanos) = if (raw as f64).abs() > NANOSECOND_THRESHOLD {
        (raw.div_euclid(NANOS_PER_SEC), raw.rem_euclid(NANOS_PER_SEC) as u32)
    } else {
        (raw, 0)
    };
    let unix = secs.checked_add(COCOA_EPOCH_OFFSET_SECS)?;
    Utc.timestamp_opt(unix, nanos).single()
}

/// Normalize a possibly-missing raw float, substituting the current time when
/// the value is unusable.
pub fn normalize(raw: Option<f64>) -> NormalizedDate {
    match raw.and_then(try_normalize) {
        Some(date) => NormalizedDate {
            date,
            estimated: false,
        },
        None => fabricated(raw.map(|v| v.to_string())),
    }
}

/// Normalize a possibly-missing raw integer, as read from the store.
pub fn normalize_raw(raw: Option<i64>) -> NormalizedDate {
    match raw.and_then(try_normalize_raw) {
        Some(date) => NormalizedDate {
            date,
            estimated: false,
        },
        None => fabricated(raw.map(|v| v.to_string())),
    }
}

fn fabricated(raw: Option<String>) -> NormalizedDate {
    warn!(raw = ?raw, "unusable message timestamp, substituting current time");
    NormalizedDate {
        date: Utc::now(),
        estimated: true,
    }
}

/// Deterministic ordering key in nanoseconds since the Unix epoch.
///
/// Unusable timestamps yield `None`, which sorts before every real instant.
pub fn sort_key(raw: Option<i64>) -> Option<i128> {
    let date = raw.and_then(try_normalize_raw)?;
    Some(date.timestamp() as i128 * NANOS_PER_SEC as i128 + date.timestamp_subsec_nanos() as i128)
}
