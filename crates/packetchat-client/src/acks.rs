//! Acknowledgment tracking for sent messages.
//!
//! Per message the state only moves `Pending -> Acknowledged`.  Acks that
//! name an unknown thread or id never create anything: they may have
//! overtaken the "sent" echo on the push channel, or belong to a session
//! that was cleared.

use packetchat_shared::{Callsign, MessageId};
use packetchat_store::Message;

use crate::messages::MessageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    Pending,
    Acknowledged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Applied,
    UnknownMessage,
    AlreadyAcked,
}

/// Ack state of a message; `None` for received messages, which carry none.
pub fn ack_state(message: &Message) -> Option<AckState> {
    if !message.is_sent() {
        return None;
    }
    Some(if message.ack {
        AckState::Acknowledged
    } else {
        AckState::Pending
    })
}

impl MessageStore {
    /// Mark a sent message in `peer`'s thread as acknowledged.
    pub fn apply_ack(&mut self, peer: &Callsign, id: MessageId) -> AckOutcome {
        let Some(message) = self.get_mut(peer, id) else {
            return AckOutcome::UnknownMessage;
        };

        match ack_state(message) {
            None => AckOutcome::UnknownMessage,
            Some(AckState::Acknowledged) => AckOutcome::AlreadyAcked,
            Some(AckState::Pending) => {
                message.ack = true;
                AckOutcome::Applied
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use packetchat_shared::Direction;

    use super::*;

    fn call(s: &str) -> Callsign {
        Callsign::parse(s).unwrap()
    }

    fn message(id: u64, direction: Direction) -> Message {
        Message {
            id: MessageId(id),
            direction,
            from: call("N0CALL"),
            to: Some(call("KI5ABC")),
            text: "hi".into(),
            raw: None,
            ack: false,
            path: None,
            msg_no: None,
            timestamp: id as f64,
        }
    }

    #[test]
    fn test_ack_applies_once() {
        let mut store = MessageStore::new();
        let peer = call("KI5ABC");
        store.ingest(&peer, message(1_700_000_000, Direction::Sent));

        let outcomes: Vec<AckOutcome> = (0..5)
            .map(|_| store.apply_ack(&peer, MessageId(1_700_000_000)))
            .collect();

        assert_eq!(outcomes[0], AckOutcome::Applied);
        assert!(outcomes[1..].iter().all(|o| *o == AckOutcome::AlreadyAcked));
        let stored = store.get(&peer, MessageId(1_700_000_000)).unwrap();
        assert_eq!(ack_state(stored), Some(AckState::Acknowledged));
    }

    #[test]
    fn test_ack_for_unknown_message_creates_nothing() {
        let mut store = MessageStore::new();
        let peer = call("KI5ABC");

        assert_eq!(
            store.apply_ack(&peer, MessageId(1_700_000_000)),
            AckOutcome::UnknownMessage
        );
        assert!(store.all_for(&peer).is_empty());
        assert!(store.to_snapshot().is_empty());

        store.ingest(&peer, message(1, Direction::Sent));
        assert_eq!(store.apply_ack(&peer, MessageId(2)), AckOutcome::UnknownMessage);
        assert_eq!(store.len_for(&peer), 1);
    }

    #[test]
    fn test_ack_on_received_message_is_unknown() {
        let mut store = MessageStore::new();
        let peer = call("KI5ABC");
        store.ingest(&peer, message(9, Direction::Received));

        assert_eq!(store.apply_ack(&peer, MessageId(9)), AckOutcome::UnknownMessage);
        assert!(!store.get(&peer, MessageId(9)).unwrap().ack);
    }
}
