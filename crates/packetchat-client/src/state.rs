//! The chat session.
//!
//! [`ChatSession`] owns every piece of in-memory state and the persistence
//! handle.  It is built once by [`ChatSession::restore`] and handed to the
//! single task that processes events and user actions, so no locking is
//! needed.  Every mutation that changes durable state ends with a save.

use tracing::{debug, error, info};

use packetchat_shared::Callsign;
use packetchat_store::{SessionPersistence, SessionSnapshot};

use crate::events::*;
use crate::locations::LocationCache;
use crate::messages::MessageStore;
use crate::notifications::NotificationCounter;
use crate::threads::ThreadRegistry;

/// Whether the session has shown any conversation yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing to show; the presentation displays its placeholder.
    Started,
    Populated,
}

pub struct ChatSession {
    pub(crate) threads: ThreadRegistry,
    pub(crate) messages: MessageStore,
    pub(crate) unread: NotificationCounter,
    pub(crate) locations: LocationCache,
    persistence: SessionPersistence,
    phase: SessionPhase,
    own_callsign: Option<Callsign>,
}

impl ChatSession {
    /// Load the durable session and rebuild the in-memory state from it.
    pub fn restore(persistence: SessionPersistence, own_callsign: Option<Callsign>) -> Self {
        let snapshot = persistence.load();
        let threads = ThreadRegistry::from_records(snapshot.threads);
        let phase = if threads.is_empty() {
            SessionPhase::Started
        } else {
            SessionPhase::Populated
        };

        info!(
            threads = threads.len(),
            locations = snapshot.locations.len(),
            phase = ?phase,
            "session restored"
        );

        Self {
            threads,
            messages: MessageStore::from_snapshot(snapshot.messages),
            unread: NotificationCounter::new(),
            locations: LocationCache::from_snapshot(snapshot.locations),
            persistence,
            phase,
            own_callsign,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            threads: self.threads.records(),
            messages: self.messages.to_snapshot(),
            locations: self.locations.to_snapshot(),
        }
    }

    /// Save the current state.  Failures are logged and processing goes on.
    pub fn persist(&mut self) -> bool {
        let snapshot = self.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save session");
                false
            }
        }
    }

    pub fn flush(&mut self) -> bool {
        self.persist()
    }

    /// Final save on teardown.
    pub fn shutdown(mut self) {
        if self.flush() {
            info!(threads = self.threads.len(), "session flushed");
        }
    }

    /// Replay the whole session to a fresh view: every thread in creation
    /// order with its messages, known locations, then the focus.
    pub fn render_all(&self, sink: &mut dyn RenderSink) {
        for (position, thread) in self.threads.threads().iter().enumerate() {
            let callsign = &thread.callsign;
            sink.emit(RenderInstruction::ThreadCreated(ThreadPayload {
                callsign: callsign.clone(),
                position,
                path: thread.path.clone(),
                location: self.locations.get(callsign).map(|l| l.summary()),
            }));

            let mut after = None;
            for message in self.messages.all_for(callsign) {
                sink.emit(RenderInstruction::MessageAppended(
                    MessageAppendedPayload::new(callsign.clone(), &message, after),
                ));
                after = Some(message.id);
            }
        }

        for (callsign, location) in self.locations.iter() {
            sink.emit(RenderInstruction::LocationUpdated(LocationPayload {
                callsign: callsign.clone(),
                summary: location.summary(),
                location: location.clone(),
            }));
        }

        if let Some(focused) = self.threads.focused() {
            sink.emit(RenderInstruction::FocusChanged(FocusPayload {
                callsign: Some(focused.clone()),
                path: self.threads.get(focused).and_then(|t| t.path.clone()),
            }));
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn own_callsign(&self) -> Option<&Callsign> {
        self.own_callsign.as_ref()
    }

    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn unread(&self) -> &NotificationCounter {
        &self.unread
    }

    pub fn locations(&self) -> &LocationCache {
        &self.locations
    }

    /// Create the thread if needed and announce it.  The first thread to
    /// appear while nothing is focused takes focus.  Returns whether it was
    /// created; the caller saves.
    pub(crate) fn ensure_thread(&mut self, callsign: &Callsign, sink: &mut dyn RenderSink) -> bool {
        let (thread, created) = self.threads.ensure_thread(callsign);
        if !created {
            return false;
        }

        sink.emit(RenderInstruction::ThreadCreated(ThreadPayload {
            callsign: thread.callsign.clone(),
            position: self.threads.position(callsign).unwrap_or(0),
            path: thread.path,
            location: self.locations.get(callsign).map(|l| l.summary()),
        }));

        if self.threads.focused().is_none() {
            self.select(callsign, sink);
        }
        true
    }

    /// Focus a thread and clear its unread count.
    pub(crate) fn select(&mut self, callsign: &Callsign, sink: &mut dyn RenderSink) -> bool {
        if !self.threads.select_thread(callsign) {
            return false;
        }

        sink.emit(RenderInstruction::FocusChanged(FocusPayload {
            callsign: Some(callsign.clone()),
            path: self.threads.get(callsign).and_then(|t| t.path.clone()),
        }));

        if self.unread.clear(callsign) > 0 {
            sink.emit(RenderInstruction::UnreadCountChanged(UnreadPayload {
                callsign: callsign.clone(),
                count: 0,
            }));
        }
        true
    }

    /// Delete a thread with its messages, location and unread count, then
    /// save.
    pub(crate) fn remove(&mut self, callsign: &Callsign, sink: &mut dyn RenderSink) -> bool {
        let Some(removed) = self.threads.remove_thread(callsign) else {
            debug!(callsign = %callsign, "ignoring removal of unknown thread");
            return false;
        };

        let dropped = self.messages.remove_thread(callsign);
        self.locations.remove(callsign);
        self.unread.clear(callsign);
        debug!(callsign = %callsign, messages = dropped, "thread contents dropped");

        sink.emit(RenderInstruction::ThreadRemoved(CallsignPayload {
            callsign: callsign.clone(),
        }));

        if let Some(focus) = removed.focus_moved {
            let path = focus
                .as_ref()
                .and_then(|c| self.threads.get(c))
                .and_then(|t| t.path.clone());
            sink.emit(RenderInstruction::FocusChanged(FocusPayload {
                callsign: focus.clone(),
                path,
            }));
            if let Some(next) = focus {
                if self.unread.clear(&next) > 0 {
                    sink.emit(RenderInstruction::UnreadCountChanged(UnreadPayload {
                        callsign: next,
                        count: 0,
                    }));
                }
            }
        }

        self.persist();
        true
    }

    /// Leave the placeholder state.  Emits `sessionPopulated` only once.
    pub(crate) fn mark_populated(&mut self, sink: &mut dyn RenderSink) {
        if self.phase == SessionPhase::Populated {
            return;
        }
        self.phase = SessionPhase::Populated;
        debug!("session populated");
        sink.emit(RenderInstruction::SessionPopulated);
    }
}
