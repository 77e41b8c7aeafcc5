//! Message keys and payloads

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of every benchmark message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Creation time, RFC 3339 with second precision
    pub created_at: String,
}

impl Payload {
    /// Payload stamped with `time`
    pub fn at(time: DateTime<Utc>) -> Self {
        Self {
            created_at: time.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Payload stamped with the current time
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// JSON encoding handed to the sink
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Fresh random message key
pub fn new_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_payload_encoding() {
        let time = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        let payload = Payload::at(time);
        assert_eq!(payload.created_at, "2023-11-14T22:13:20Z");
        assert_eq!(
            payload.encode().unwrap(),
            br#"{"created_at":"2023-11-14T22:13:20Z"}"#.to_vec()
        );
    }

    #[test]
    fn test_payload_now_is_rfc3339() {
        let payload = Payload::now();
        assert!(DateTime::parse_from_rfc3339(&payload.created_at).is_ok());
        assert!(payload.created_at.ends_with('Z'));
    }

    #[test]
    fn test_keys_unique() {
        let a = new_key();
        let b = new_key();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
