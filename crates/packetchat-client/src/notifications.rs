use std::collections::HashMap;

use packetchat_shared::Callsign;

/// Unread message counts per thread.  The focused thread never accrues any.
#[derive(Debug, Clone, Default)]
pub struct NotificationCounter {
    counts: HashMap<Callsign, u32>,
}

impl NotificationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one unread message for `peer` unless it is the focused thread.
    /// Returns the new count when it changed.
    pub fn increment(&mut self, peer: &Callsign, focused: Option<&Callsign>) -> Option<u32> {
        if focused == Some(peer) {
            return None;
        }
        let count = self.counts.entry(peer.clone()).or_insert(0);
        *count = count.saturating_add(1);
        Some(*count)
    }

    /// Reset to zero.  Returns the count that was cleared.
    pub fn clear(&mut self, peer: &Callsign) -> u32 {
        self.counts.remove(peer).unwrap_or(0)
    }

    pub fn count(&self, peer: &Callsign) -> u32 {
        self.counts.get(peer).copied().unwrap_or(0)
    }
}
