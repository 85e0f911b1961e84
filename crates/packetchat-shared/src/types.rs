use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_CALLSIGN_LEN;
use crate::error::EventError;

// Peer identity = uppercase, trimmed callsign ("KI5ABC-7")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Callsign(String);

impl Callsign {
    pub fn parse(raw: &str) -> Result<Self, EventError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(EventError::EmptyCallsign);
        }
        if normalized.chars().count() > MAX_CALLSIGN_LEN {
            return Err(EventError::CallsignTooLong(normalized));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Callsign {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Callsign {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Callsign> for String {
    fn from(value: Callsign) -> Self {
        value.0
    }
}

/// Whole-second identifier derived from a message timestamp.
///
/// Ordering is numeric, so sorting by id sorts by send time.  In JSON
/// map keys it appears as the decimal string (`"1700000000"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Milliseconds since the epoch, for presentation clocks.
    pub fn as_millis(&self) -> u64 {
        self.0.saturating_mul(1000)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::codec::message_id_from_str(s).ok_or_else(|| EventError::InvalidField {
            field: "msgId",
            reason: format!("not a timestamp: {s:?}"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Local echo of a message we transmitted
    Sent,
    /// Message addressed to us by a peer
    Received,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callsign_normalized() {
        let call = Callsign::parse("  ki5abc-7 ").unwrap();
        assert_eq!(call.as_str(), "KI5ABC-7");
        assert_eq!(call, "KI5ABC-7".parse().unwrap());
    }

    #[test]
    fn test_callsign_rejects_empty_and_long() {
        assert!(matches!(Callsign::parse("   "), Err(EventError::EmptyCallsign)));
        assert!(matches!(
            Callsign::parse("TOOLONGCALL1"),
            Err(EventError::CallsignTooLong(_))
        ));
    }

    #[test]
    fn test_callsign_deserialize_normalizes() {
        let call: Callsign = serde_json::from_str("\"n0call\"").unwrap();
        assert_eq!(call.as_str(), "N0CALL");
        assert!(serde_json::from_str::<Callsign>("\"\"").is_err());
    }

    #[test]
    fn test_message_id_map_key_is_decimal_string() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(MessageId(1_700_000_000), true);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1700000000":true}"#);

        let back: std::collections::BTreeMap<MessageId, bool> =
            serde_json::from_str(&json).unwrap();
        assert!(back.contains_key(&MessageId(1_700_000_000)));
    }
}
