//! Serde helpers for the timestamp shapes the backend emits
//!
//! SQLite rows come back as "YYYY-MM-DD HH:MM:SS", pandas sometimes sends RFC 3339,
//! and the equity endpoint uses unix seconds (integer, float or numeric string).

use crate::utils::{parse_timestamp, timestamp_from_secs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Int(i64),
    Float(f64),
    Text(String),
}

fn decode(raw: RawTime) -> crate::error::Result<DateTime<Utc>> {
    match raw {
        RawTime::Int(secs) => timestamp_from_secs(secs as f64),
        RawTime::Float(secs) => timestamp_from_secs(secs),
        RawTime::Text(text) => parse_timestamp(&text),
    }
}

/// `DateTime<Utc>` field, serialized as unix seconds
pub mod flexible {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTime::deserialize(deserializer)?;
        decode(raw).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp())
    }
}

/// `i64` unix-seconds field accepting any timestamp shape on input
pub mod unix_secs {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTime::deserialize(deserializer)?;
        decode(raw)
            .map(|dt| dt.timestamp())
            .map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(*value)
    }
}
