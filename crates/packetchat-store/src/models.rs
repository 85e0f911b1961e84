//! Domain model structs persisted in the session documents.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be written to
//! the key-value store as JSON and handed to the presentation layer as-is.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use packetchat_shared::{Callsign, Direction, MessageId};

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message inside a thread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Whole-second identifier, unique within the thread.
    pub id: MessageId,
    pub direction: Direction,
    pub from: Callsign,
    /// Addressee; peers do not always report it on received messages.
    #[serde(default)]
    pub to: Option<Callsign>,
    pub text: String,
    /// Raw packet as it went over the air.
    #[serde(default)]
    pub raw: Option<String>,
    /// Acknowledgment flag.  Only meaningful for sent messages, and only
    /// ever moves from `false` to `true`.
    #[serde(default)]
    pub ack: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub msg_no: Option<String>,
    /// Original fractional timestamp.
    #[serde(default)]
    pub timestamp: f64,
}

impl Message {
    pub fn is_sent(&self) -> bool {
        self.direction == Direction::Sent
    }

    /// Send time as a UTC instant (second resolution).
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.id.as_secs()).ok()?;
        Utc.timestamp_opt(secs, 0).single()
    }
}

// ---------------------------------------------------------------------------
// Thread
// ---------------------------------------------------------------------------

/// Persisted form of a conversation thread: its peer and the routing path
/// last used with it.  Position in [`SessionSnapshot::threads`] is the
/// creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadRecord {
    pub callsign: Callsign,
    #[serde(default)]
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Last-known position of a peer.  Replaced wholesale on every update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub lat: f64,
    pub lon: f64,
    /// Metres
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Kilometres per hour
    #[serde(default)]
    pub speed: Option<f64>,
    /// Degrees true
    #[serde(default)]
    pub course: Option<f64>,
    /// Kilometres from our own position
    #[serde(default)]
    pub distance: Option<f64>,
    /// When the peer reported this position (epoch seconds).
    #[serde(default)]
    pub lasttime: Option<i64>,
    /// When we received it.
    pub last_updated: DateTime<Utc>,
}

impl LocationRecord {
    /// Compact one-line form: `"12.4km@270° 2023-11-14 22:13:20"`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(distance) = self.distance {
            out.push_str(&format!("{distance}km"));
        }
        if let Some(course) = self.course {
            out.push_str(&format!("@{course}°"));
        }

        let reported = self
            .lasttime
            .and_then(|t| Utc.timestamp_opt(t, 0).single())
            .unwrap_or(self.last_updated);
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&reported.format("%Y-%m-%d %H:%M:%S").to_string());
        out
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The whole durable session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    /// Threads in creation order.
    pub threads: Vec<ThreadRecord>,
    /// Messages per thread, ascending by id.
    pub messages: BTreeMap<Callsign, BTreeMap<MessageId, Message>>,
    pub locations: BTreeMap<Callsign, LocationRecord>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty() && self.messages.is_empty() && self.locations.is_empty()
    }

    /// Repair a snapshot read back from disk.
    ///
    /// Drops repeated thread entries (first wins), re-keys messages by their
    /// own id, and appends a thread for any callsign that has messages but
    /// no thread entry so every stored message stays reachable.
    pub fn normalize(mut self) -> Self {
        let mut seen = HashSet::new();
        self.threads.retain(|t| seen.insert(t.callsign.clone()));

        let mut messages = BTreeMap::new();
        for (callsign, by_id) in std::mem::take(&mut self.messages) {
            let mut rekeyed = BTreeMap::new();
            for msg in by_id.into_values() {
                rekeyed.entry(msg.id).or_insert(msg);
            }
            if rekeyed.is_empty() {
                continue;
            }
            if seen.insert(callsign.clone()) {
                tracing::warn!(callsign = %callsign, "messages without a thread entry, restoring thread");
                self.threads.push(ThreadRecord {
                    callsign: callsign.clone(),
                    path: None,
                });
            }
            messages.insert(callsign, rekeyed);
        }
        self.messages = messages;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(s: &str) -> Callsign {
        Callsign::parse(s).unwrap()
    }

    fn sent(id: u64) -> Message {
        Message {
            id: MessageId(id),
            direction: Direction::Sent,
            from: call("N0CALL"),
            to: Some(call("KI5ABC")),
            text: format!("msg {id}"),
            raw: None,
            ack: false,
            path: None,
            msg_no: None,
            timestamp: id as f64,
        }
    }

    #[test]
    fn test_normalize_restores_missing_thread() {
        let mut snapshot = SessionSnapshot {
            threads: vec![
                ThreadRecord { callsign: call("A"), path: None },
                ThreadRecord { callsign: call("A"), path: Some("WIDE1-1".into()) },
            ],
            ..Default::default()
        };
        snapshot
            .messages
            .entry(call("KI5ABC"))
            .or_default()
            .insert(MessageId(5), sent(5));

        let fixed = snapshot.normalize();
        let order: Vec<&str> = fixed.threads.iter().map(|t| t.callsign.as_str()).collect();
        assert_eq!(order, vec!["A", "KI5ABC"]);
        assert_eq!(fixed.threads[0].path, None);
    }

    #[test]
    fn test_normalize_rekeys_by_message_id() {
        let mut snapshot = SessionSnapshot::default();
        snapshot.threads.push(ThreadRecord { callsign: call("KI5ABC"), path: None });
        // stored under the wrong key
        snapshot
            .messages
            .entry(call("KI5ABC"))
            .or_default()
            .insert(MessageId(1), sent(7));

        let fixed = snapshot.normalize();
        let by_id = &fixed.messages[&call("KI5ABC")];
        assert!(by_id.contains_key(&MessageId(7)));
        assert!(!by_id.contains_key(&MessageId(1)));
    }

    #[test]
    fn test_location_summary() {
        let record = LocationRecord {
            lat: 30.25,
            lon: -97.75,
            altitude: Some(150.0),
            speed: Some(0.0),
            course: Some(270.0),
            distance: Some(12.4),
            lasttime: Some(1_700_000_000),
            last_updated: Utc::now(),
        };
        assert_eq!(record.summary(), "12.4km@270° 2023-11-14 22:13:20");
    }

    #[test]
    fn test_message_sent_at() {
        assert_eq!(
            sent(1_700_000_000).sent_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }
}
