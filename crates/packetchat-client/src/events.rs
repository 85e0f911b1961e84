//! Render instructions for the presentation layer.
//!
//! Each instruction carries only what a view needs to patch itself.  Messages
//! are addressed by `(callsign, id)`; turning that into a widget or element
//! handle is the presentation's business.

use std::io::Write;

use serde::Serialize;

use packetchat_shared::{Callsign, Direction, MessageId};
use packetchat_store::{LocationRecord, Message};

pub const EVENT_THREAD_CREATED: &str = "threadCreated";
pub const EVENT_THREAD_REMOVED: &str = "threadRemoved";
pub const EVENT_MESSAGE_APPENDED: &str = "messageAppended";
pub const EVENT_MESSAGE_FLASHED: &str = "messageFlashed";
pub const EVENT_ACK_UPDATED: &str = "ackUpdated";
pub const EVENT_LOCATION_UPDATED: &str = "locationUpdated";
pub const EVENT_LOCATION_REQUESTED: &str = "locationRequested";
pub const EVENT_UNREAD_COUNT_CHANGED: &str = "unreadCountChanged";
pub const EVENT_FOCUS_CHANGED: &str = "focusChanged";
pub const EVENT_SESSION_POPULATED: &str = "sessionPopulated";
pub const EVENT_COMMAND_REJECTED: &str = "commandRejected";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum RenderInstruction {
    ThreadCreated(ThreadPayload),
    ThreadRemoved(CallsignPayload),
    MessageAppended(MessageAppendedPayload),
    MessageFlashed(MessageKeyPayload),
    AckUpdated(MessageKeyPayload),
    LocationUpdated(LocationPayload),
    LocationRequested(CallsignPayload),
    UnreadCountChanged(UnreadPayload),
    FocusChanged(FocusPayload),
    SessionPopulated,
    CommandRejected(RejectedPayload),
}

impl RenderInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            RenderInstruction::ThreadCreated(_) => EVENT_THREAD_CREATED,
            RenderInstruction::ThreadRemoved(_) => EVENT_THREAD_REMOVED,
            RenderInstruction::MessageAppended(_) => EVENT_MESSAGE_APPENDED,
            RenderInstruction::MessageFlashed(_) => EVENT_MESSAGE_FLASHED,
            RenderInstruction::AckUpdated(_) => EVENT_ACK_UPDATED,
            RenderInstruction::LocationUpdated(_) => EVENT_LOCATION_UPDATED,
            RenderInstruction::LocationRequested(_) => EVENT_LOCATION_REQUESTED,
            RenderInstruction::UnreadCountChanged(_) => EVENT_UNREAD_COUNT_CHANGED,
            RenderInstruction::FocusChanged(_) => EVENT_FOCUS_CHANGED,
            RenderInstruction::SessionPopulated => EVENT_SESSION_POPULATED,
            RenderInstruction::CommandRejected(_) => EVENT_COMMAND_REJECTED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayload {
    pub callsign: Callsign,
    /// Index in creation (tab) order.
    pub position: usize,
    pub path: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsignPayload {
    pub callsign: Callsign,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKeyPayload {
    pub callsign: Callsign,
    pub id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAppendedPayload {
    /// Thread the message belongs to.
    pub callsign: Callsign,
    pub id: MessageId,
    /// The message sorted just before this one, so late deliveries can be
    /// placed in order.  `None` means "first in thread".
    pub after: Option<MessageId>,
    pub direction: Direction,
    pub from: Callsign,
    pub to: Option<Callsign>,
    pub text: String,
    pub raw: Option<String>,
    /// `None` for received messages.
    pub acked: Option<bool>,
    /// Milliseconds since the epoch.
    pub sent_at_ms: u64,
}

impl MessageAppendedPayload {
    pub fn new(callsign: Callsign, message: &Message, after: Option<MessageId>) -> Self {
        Self {
            callsign,
            id: message.id,
            after,
            direction: message.direction,
            from: message.from.clone(),
            to: message.to.clone(),
            text: message.text.clone(),
            raw: message.raw.clone(),
            acked: message.is_sent().then_some(message.ack),
            sent_at_ms: message.id.as_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    pub callsign: Callsign,
    pub summary: String,
    pub location: LocationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadPayload {
    pub callsign: Callsign,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusPayload {
    /// `None` when no thread is left to focus.
    pub callsign: Option<Callsign>,
    /// Routing path to preset in the composer.
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedPayload {
    pub action: String,
    pub reason: String,
}

/// Receives render instructions in the order they are produced.
pub trait RenderSink {
    fn emit(&mut self, instruction: RenderInstruction);
}

impl RenderSink for Vec<RenderInstruction> {
    fn emit(&mut self, instruction: RenderInstruction) {
        self.push(instruction);
    }
}

/// Writes one JSON object per instruction, newline-delimited.
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonLinesSink<W> {
    fn emit(&mut self, instruction: RenderInstruction) {
        let event = instruction.name();
        let line = match serde_json::to_string(&instruction) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(event, error = %e, "Failed to encode render instruction");
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            tracing::error!(event, error = %e, "Failed to emit render instruction");
        }
    }
}
