//! Conversation thread registry.
//!
//! Owns which peer threads exist, their creation order (which is also the
//! tab order) and which one is focused.  Focus always names an existing
//! thread or nothing.

use tracing::debug;

use packetchat_shared::Callsign;
use packetchat_store::ThreadRecord;

/// A conversation with one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub callsign: Callsign,
    /// Routing path last used with this peer.
    pub path: Option<String>,
}

/// Result of [`ThreadRegistry::remove_thread`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedThread {
    pub thread: Thread,
    /// Set when the removed thread held focus; carries the new focus.
    pub focus_moved: Option<Option<Callsign>>,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadRegistry {
    threads: Vec<Thread>,
    focused: Option<Callsign>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records, keeping their order.  The first thread
    /// becomes focused.
    pub fn from_records(records: Vec<ThreadRecord>) -> Self {
        let mut registry = Self::new();
        for record in records {
            let (_, created) = registry.ensure_thread(&record.callsign);
            if created {
                registry.set_path(&record.callsign, record.path);
            }
        }
        registry.focused = registry.threads.first().map(|t| t.callsign.clone());
        registry
    }

    /// Idempotent creation.  Returns the thread and whether it was created.
    pub fn ensure_thread(&mut self, callsign: &Callsign) -> (Thread, bool) {
        if let Some(thread) = self.get(callsign) {
            return (thread.clone(), false);
        }

        let thread = Thread {
            callsign: callsign.clone(),
            path: None,
        };
        self.threads.push(thread.clone());
        debug!(callsign = %callsign, position = self.threads.len() - 1, "thread created");
        (thread, true)
    }

    /// Focus a thread.  Unknown callsigns are ignored and `false` returned.
    pub fn select_thread(&mut self, callsign: &Callsign) -> bool {
        if !self.contains(callsign) {
            debug!(callsign = %callsign, "ignoring focus on unknown thread");
            return false;
        }
        self.focused = Some(callsign.clone());
        true
    }

    /// Delete a thread.  If it was focused, focus passes to the first
    /// remaining thread in creation order, or to nothing.
    pub fn remove_thread(&mut self, callsign: &Callsign) -> Option<RemovedThread> {
        let index = self.position(callsign)?;
        let thread = self.threads.remove(index);

        let focus_moved = if self.focused.as_ref() == Some(callsign) {
            self.focused = self.threads.first().map(|t| t.callsign.clone());
            Some(self.focused.clone())
        } else {
            None
        };

        debug!(callsign = %callsign, "thread removed");
        Some(RemovedThread { thread, focus_moved })
    }

    /// Record the routing path last used with a peer.
    pub fn set_path(&mut self, callsign: &Callsign, path: Option<String>) -> bool {
        match self.threads.iter_mut().find(|t| &t.callsign == callsign) {
            Some(thread) => {
                thread.path = path;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, callsign: &Callsign) -> Option<&Thread> {
        self.threads.iter().find(|t| &t.callsign == callsign)
    }

    pub fn contains(&self, callsign: &Callsign) -> bool {
        self.get(callsign).is_some()
    }

    /// Index in creation order.
    pub fn position(&self, callsign: &Callsign) -> Option<usize> {
        self.threads.iter().position(|t| &t.callsign == callsign)
    }

    /// All threads in creation order.
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }

    pub fn focused(&self) -> Option<&Callsign> {
        self.focused.as_ref()
    }

    pub fn is_focused(&self, callsign: &Callsign) -> bool {
        self.focused.as_ref() == Some(callsign)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn records(&self) -> Vec<ThreadRecord> {
        self.threads
            .iter()
            .map(|t| ThreadRecord {
                callsign: t.callsign.clone(),
                path: t.path.clone(),
            })
            .collect()
    }
}
