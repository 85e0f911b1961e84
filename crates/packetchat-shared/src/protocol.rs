use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{message_id_from_value, timestamp_from_value};
use crate::error::EventError;
use crate::types::{Callsign, MessageId};

/// Event kinds delivered by the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Local echo of a message we submitted
    Sent,
    /// A message from a peer
    Received,
    /// Acknowledgment of one of our sent messages
    Ack,
    /// A peer's last-known position
    Location,
}

/// Raw inbound frame, exactly as decoded from JSON.
///
/// Field names follow the push channel; the aliases cover the older
/// console payloads (`from_call`, `message_text`, `timestamp`).  Nothing here
/// is validated yet; see [`ChatEvent::try_from`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    pub kind: Option<EventKind>,
    #[serde(default, alias = "from_call")]
    pub from: Option<String>,
    #[serde(default, alias = "to_call")]
    pub to: Option<String>,
    #[serde(default, alias = "message_text", alias = "message")]
    pub text: Option<String>,
    #[serde(default, alias = "timestamp")]
    pub ts: Option<Value>,
    #[serde(default, rename = "msgId")]
    pub msg_id: Option<Value>,
    #[serde(default, rename = "msgNo")]
    pub msg_no: Option<Value>,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub callsign: Option<String>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub lon: Option<Value>,
    #[serde(default)]
    pub altitude: Option<Value>,
    #[serde(default)]
    pub speed: Option<Value>,
    #[serde(default)]
    pub course: Option<Value>,
    #[serde(default)]
    pub distance: Option<Value>,
    #[serde(default)]
    pub lasttime: Option<Value>,
}

/// A validated inbound event, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Sent(MessageEvent),
    Received(MessageEvent),
    Ack(AckEvent),
    Location(LocationEvent),
}

/// Payload shared by sent echoes and received messages.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub id: MessageId,
    /// Original fractional timestamp (falls back to the id when absent)
    pub timestamp: f64,
    pub from: Callsign,
    pub to: Option<Callsign>,
    pub text: String,
    pub raw: Option<String>,
    pub path: Option<String>,
    /// Wire message number, if the packet carried one
    pub msg_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AckEvent {
    pub id: MessageId,
    /// The callsign our original message was addressed to
    pub to: Callsign,
    pub from: Option<Callsign>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvent {
    pub callsign: Callsign,
    pub lat: f64,
    pub lon: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub distance: Option<f64>,
    /// Peer-reported position time (epoch seconds)
    pub lasttime: Option<i64>,
}

impl ChatEvent {
    /// Decode and validate a single JSON frame.
    pub fn from_json(data: &str) -> Result<Self, EventError> {
        let raw: InboundEvent = serde_json::from_str(data)?;
        Self::try_from(raw)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Sent(_) => EventKind::Sent,
            ChatEvent::Received(_) => EventKind::Received,
            ChatEvent::Ack(_) => EventKind::Ack,
            ChatEvent::Location(_) => EventKind::Location,
        }
    }
}

impl TryFrom<InboundEvent> for ChatEvent {
    type Error = EventError;

    fn try_from(ev: InboundEvent) -> Result<Self, Self::Error> {
        let kind = ev.kind.ok_or(EventError::MissingField("kind"))?;
        match kind {
            EventKind::Sent => {
                let msg = message_event(&ev)?;
                if msg.to.is_none() {
                    return Err(EventError::MissingField("to"));
                }
                Ok(ChatEvent::Sent(msg))
            }
            EventKind::Received => Ok(ChatEvent::Received(message_event(&ev)?)),
            EventKind::Ack => {
                let (id, _) = resolve_id(&ev)?;
                let to = required_callsign(ev.to.as_deref(), "to")?;
                let from = optional_callsign(ev.from.as_deref())?;
                Ok(ChatEvent::Ack(AckEvent { id, to, from }))
            }
            EventKind::Location => {
                let callsign = match ev.callsign.as_deref() {
                    Some(c) => Callsign::parse(c)?,
                    None => required_callsign(ev.from.as_deref(), "callsign")?,
                };
                Ok(ChatEvent::Location(LocationEvent {
                    callsign,
                    lat: required_number(ev.lat.as_ref(), "lat")?,
                    lon: required_number(ev.lon.as_ref(), "lon")?,
                    altitude: optional_number(ev.altitude.as_ref(), "altitude")?,
                    speed: optional_number(ev.speed.as_ref(), "speed")?,
                    course: optional_number(ev.course.as_ref(), "course")?,
                    distance: optional_number(ev.distance.as_ref(), "distance")?,
                    lasttime: optional_number(ev.lasttime.as_ref(), "lasttime")?
                        .map(|t| t.trunc() as i64),
                }))
            }
        }
    }
}

/// Commands submitted to the push channel on the user's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum OutboundCommand {
    /// Transmit a text message; the server answers with a "sent" echo
    Send {
        to: Callsign,
        text: String,
        path: Option<String>,
    },
    /// Ask the server to look up a peer's last position
    RequestLocation { callsign: Callsign },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn message_event(ev: &InboundEvent) -> Result<MessageEvent, EventError> {
    let (id, timestamp) = resolve_id(ev)?;
    let from = required_callsign(ev.from.as_deref(), "from")?;
    let to = optional_callsign(ev.to.as_deref())?;
    let text = ev.text.clone().ok_or(EventError::MissingField("text"))?;

    Ok(MessageEvent {
        id,
        timestamp,
        from,
        to,
        text,
        raw: ev.raw.clone(),
        path: ev.path.clone().filter(|p| !p.trim().is_empty()),
        msg_no: ev.msg_no.as_ref().and_then(value_to_text),
    })
}

/// `ts` wins; a numeric `msgId` is the fallback identifier.
fn resolve_id(ev: &InboundEvent) -> Result<(MessageId, f64), EventError> {
    if let Some(ts) = ev.ts.as_ref().filter(|v| !v.is_null()) {
        let id = message_id_from_value(ts).ok_or_else(|| EventError::InvalidField {
            field: "ts",
            reason: format!("not a timestamp: {ts}"),
        })?;
        let fractional = timestamp_from_value(ts).unwrap_or(id.as_secs() as f64);
        return Ok((id, fractional));
    }

    if let Some(raw_id) = ev.msg_id.as_ref().filter(|v| !v.is_null()) {
        let id = message_id_from_value(raw_id).ok_or_else(|| EventError::InvalidField {
            field: "msgId",
            reason: format!("not a timestamp: {raw_id}"),
        })?;
        return Ok((id, id.as_secs() as f64));
    }

    Err(EventError::MissingField("ts"))
}

fn required_callsign(raw: Option<&str>, field: &'static str) -> Result<Callsign, EventError> {
    match raw {
        Some(s) => Callsign::parse(s),
        None => Err(EventError::MissingField(field)),
    }
}

fn optional_callsign(raw: Option<&str>) -> Result<Option<Callsign>, EventError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Callsign::parse(s).map(Some),
    }
}

fn required_number(value: Option<&Value>, field: &'static str) -> Result<f64, EventError> {
    optional_number(value, field)?.ok_or(EventError::MissingField(field))
}

fn optional_number(value: Option<&Value>, field: &'static str) -> Result<Option<f64>, EventError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => number_from_value(v)
            .map(Some)
            .ok_or_else(|| EventError::InvalidField {
                field,
                reason: format!("not a number: {v}"),
            }),
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
