//! Identity and timestamp types for CodeAir entities

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

/// Source-control project identifier (numeric on the GitLab side).
pub type ProjectId = u64;

/// Agent identifier. Placeholder agents use the zero-prefixed sentinel range.
pub type AgentId = Uuid;

/// Job identifier assigned by the worker queue.
pub type JobId = u64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Textual prefix shared by every placeholder agent id.
pub const PLACEHOLDER_ID_PREFIX: &str = "00000000-0000-0000-0000";

/// True when the id lies in the placeholder range (first 80 bits zero).
pub fn is_placeholder_id(id: &AgentId) -> bool {
    id.as_u128() >> 48 == 0
}

/// Parse a server timestamp.
///
/// The API emits naive ISO-8601 datetimes for UTC values, while other
/// collaborators send RFC 3339. Both are accepted; naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// Serde adapter for required timestamps.
pub mod timestamp {
    use super::{parse_timestamp, Timestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// Serde adapter for nullable timestamps.
pub mod optional_timestamp {
    use super::{parse_timestamp, Timestamp};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
            None => Ok(None),
        }
    }
}
