//! Inbound event dispatch.
//!
//! Each push-channel event is handled to completion before the next one:
//! state is mutated, the session saved, then the view patched.  Frames that
//! fail to decode never reach the dispatcher.

use chrono::Utc;
use tracing::{debug, warn};

use packetchat_shared::protocol::{AckEvent, ChatEvent, LocationEvent, MessageEvent};
use packetchat_shared::{Callsign, Direction};
use packetchat_store::Message;

use crate::acks::AckOutcome;
use crate::events::*;
use crate::locations::record_from_event;
use crate::messages::IngestOutcome;
use crate::state::ChatSession;

/// What handling an event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Appended,
    /// A received message arrived again; the existing entry was flashed.
    Flashed,
    /// A sent echo arrived again and was absorbed.
    DuplicateIgnored,
    Ack(AckOutcome),
    LocationUpdated,
}

impl ChatSession {
    /// Decode one raw frame and dispatch it.  Malformed frames are logged and
    /// dropped; `None` is returned for them.
    pub fn handle_frame(&mut self, frame: &str, sink: &mut dyn RenderSink) -> Option<EventOutcome> {
        match ChatEvent::from_json(frame) {
            Ok(event) => Some(self.handle_event(event, sink)),
            Err(e) => {
                warn!(error = %e, "dropping malformed event");
                None
            }
        }
    }

    pub fn handle_event(&mut self, event: ChatEvent, sink: &mut dyn RenderSink) -> EventOutcome {
        debug!(kind = ?event.kind(), "handling event");
        match event {
            ChatEvent::Sent(msg) => self.on_message(msg, Direction::Sent, sink),
            ChatEvent::Received(msg) => self.on_message(msg, Direction::Received, sink),
            ChatEvent::Ack(ack) => self.on_ack(ack, sink),
            ChatEvent::Location(location) => self.on_location(location, sink),
        }
    }

    fn on_message(
        &mut self,
        event: MessageEvent,
        direction: Direction,
        sink: &mut dyn RenderSink,
    ) -> EventOutcome {
        // a sent echo always carries `to`; decoding rejects it otherwise
        let peer = match (direction, &event.to) {
            (Direction::Sent, Some(to)) => to.clone(),
            _ => event.from.clone(),
        };

        if direction == Direction::Received {
            if let (Some(own), Some(to)) = (self.own_callsign(), event.to.as_ref()) {
                if own != to {
                    debug!(from = %event.from, to = %to, "received message addressed elsewhere");
                }
            }
        }

        self.mark_populated(sink);
        let created = self.ensure_thread(&peer, sink);

        let message = message_from_event(event, direction);
        let id = message.id;
        let path = message.path.clone();

        match self.messages.ingest(&peer, message.clone()) {
            IngestOutcome::Inserted => {}
            IngestOutcome::DuplicateIgnored => {
                if created {
                    self.persist();
                }
                return match direction {
                    Direction::Received => {
                        debug!(callsign = %peer, msg_id = %id, "duplicate message, flashing");
                        sink.emit(RenderInstruction::MessageFlashed(MessageKeyPayload {
                            callsign: peer,
                            id,
                        }));
                        EventOutcome::Flashed
                    }
                    Direction::Sent => {
                        debug!(callsign = %peer, msg_id = %id, "duplicate sent echo ignored");
                        EventOutcome::DuplicateIgnored
                    }
                };
            }
        }

        if path.is_some() {
            self.threads.set_path(&peer, path);
        }
        self.persist();

        let after = self.messages.previous_id(&peer, id);
        sink.emit(RenderInstruction::MessageAppended(MessageAppendedPayload::new(
            peer.clone(),
            &message,
            after,
        )));

        if direction == Direction::Received {
            let focused = self.threads.focused().cloned();
            if let Some(count) = self.unread.increment(&peer, focused.as_ref()) {
                sink.emit(RenderInstruction::UnreadCountChanged(UnreadPayload {
                    callsign: peer,
                    count,
                }));
            }
        }

        EventOutcome::Appended
    }

    fn on_ack(&mut self, ack: AckEvent, sink: &mut dyn RenderSink) -> EventOutcome {
        let outcome = self.messages.apply_ack(&ack.to, ack.id);
        match outcome {
            AckOutcome::Applied => {
                self.persist();
                sink.emit(RenderInstruction::AckUpdated(MessageKeyPayload {
                    callsign: ack.to,
                    id: ack.id,
                }));
            }
            AckOutcome::AlreadyAcked => {
                debug!(callsign = %ack.to, msg_id = %ack.id, "message already acknowledged");
            }
            AckOutcome::UnknownMessage => {
                let elsewhere = ack
                    .from
                    .as_ref()
                    .filter(|from| self.messages.get(from, ack.id).is_some());
                match elsewhere {
                    Some(from) => warn!(
                        to = %ack.to,
                        from = %from,
                        msg_id = %ack.id,
                        "ack matches no message for its recipient but one for its sender, ignoring"
                    ),
                    None => debug!(callsign = %ack.to, msg_id = %ack.id, "ack for unknown message"),
                }
            }
        }
        EventOutcome::Ack(outcome)
    }

    fn on_location(&mut self, event: LocationEvent, sink: &mut dyn RenderSink) -> EventOutcome {
        let record = record_from_event(&event, Utc::now());
        let summary = record.summary();
        let callsign: Callsign = event.callsign;

        self.locations.set(callsign.clone(), record.clone());
        self.persist();

        debug!(callsign = %callsign, summary = %summary, "location updated");
        sink.emit(RenderInstruction::LocationUpdated(LocationPayload {
            callsign,
            summary,
            location: record,
        }));
        EventOutcome::LocationUpdated
    }
}

fn message_from_event(event: MessageEvent, direction: Direction) -> Message {
    Message {
        id: event.id,
        direction,
        from: event.from,
        to: event.to,
        text: event.text,
        raw: event.raw,
        ack: false,
        path: event.path,
        msg_no: event.msg_no,
        timestamp: event.timestamp,
    }
}
