//! Per-thread message store.
//!
//! Messages are keyed by their timestamp-derived id, so iteration order is
//! send order no matter how the push channel interleaved deliveries.  The
//! first copy of an id wins; re-deliveries are reported and dropped.

use std::collections::{BTreeMap, HashMap};

use packetchat_shared::{Callsign, MessageId};
use packetchat_store::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    /// An entry with this id already existed; nothing was changed.
    DuplicateIgnored,
}

#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    threads: HashMap<Callsign, BTreeMap<MessageId, Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(messages: BTreeMap<Callsign, BTreeMap<MessageId, Message>>) -> Self {
        Self {
            threads: messages.into_iter().collect(),
        }
    }

    pub fn ingest(&mut self, peer: &Callsign, message: Message) -> IngestOutcome {
        let thread = self.threads.entry(peer.clone()).or_default();
        if thread.contains_key(&message.id) {
            return IngestOutcome::DuplicateIgnored;
        }
        thread.insert(message.id, message);
        IngestOutcome::Inserted
    }

    /// Every message of a thread, ascending by id.
    pub fn all_for(&self, peer: &Callsign) -> Vec<Message> {
        self.threads
            .get(peer)
            .map(|thread| thread.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, peer: &Callsign, id: MessageId) -> Option<&Message> {
        self.threads.get(peer)?.get(&id)
    }

    pub(crate) fn get_mut(&mut self, peer: &Callsign, id: MessageId) -> Option<&mut Message> {
        self.threads.get_mut(peer)?.get_mut(&id)
    }

    /// Id of the message sorted immediately before `id`, if any.
    pub fn previous_id(&self, peer: &Callsign, id: MessageId) -> Option<MessageId> {
        self.threads
            .get(peer)?
            .range(..id)
            .next_back()
            .map(|(prev, _)| *prev)
    }

    pub fn len_for(&self, peer: &Callsign) -> usize {
        self.threads.get(peer).map_or(0, BTreeMap::len)
    }

    /// Drop a thread's messages.  Returns how many were removed.
    pub fn remove_thread(&mut self, peer: &Callsign) -> usize {
        self.threads.remove(peer).map_or(0, |thread| thread.len())
    }

    pub fn to_snapshot(&self) -> BTreeMap<Callsign, BTreeMap<MessageId, Message>> {
        self.threads
            .iter()
            .filter(|(_, thread)| !thread.is_empty())
            .map(|(peer, thread)| (peer.clone(), thread.clone()))
            .collect()
    }
}
