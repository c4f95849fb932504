pub mod deduplication;

use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Read an environment variable, treating empty values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim whitespace and trailing slashes from a base URL and check its scheme
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let base_url = raw.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(AppError::Config(format!(
            "Invalid base_url: must start with http:// or https://, got: '{}'",
            base_url
        )));
    }

    Ok(base_url)
}

/// Convert a dashboard symbol into the exchange pair format ("BTC/BRL" -> "BTCBRL")
pub fn exchange_pair(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_') && !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Parse a timestamp string in any of the formats the backend emits
///
/// Accepted: RFC 3339, "YYYY-MM-DD HH:MM:SS[.fff]" (UTC), "YYYY-MM-DDTHH:MM:SS[.fff]" (UTC),
/// and unix seconds as a numeric string.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(secs) = raw.parse::<f64>() {
        return timestamp_from_secs(secs);
    }

    Err(AppError::Parse(format!("Unrecognized timestamp: '{}'", raw)))
}

/// Build a UTC timestamp from (possibly fractional) unix seconds
pub fn timestamp_from_secs(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(AppError::Malformed(format!("Non-finite timestamp: {}", secs)));
    }
    Utc.timestamp_opt(secs.floor() as i64, 0)
        .single()
        .ok_or_else(|| AppError::Malformed(format!("Timestamp out of range: {}", secs)))
}

/// Reject NaN and infinities in a numeric field
pub fn ensure_finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::Malformed(format!("Field '{}' is not finite: {}", field, value)))
    }
}

/// Parse a numeric string field (exchange payloads quote their numbers)
pub fn parse_decimal(field: &str, raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| {
            AppError::Malformed(format!(
                "Field '{}' is not a number ('{}'): {}",
                field, raw, e
            ))
        })?;
    ensure_finite(field, value)
}
