//! User action handlers.
//!
//! Each sub-module groups related actions.  Actions arrive from the console
//! as [`UserAction`] values and are applied to the session by the bridge.

pub mod location;
pub mod messaging;
pub mod threads;

use serde::Deserialize;

use crate::events::{RejectedPayload, RenderInstruction, RenderSink};

/// An action taken by the operator.  Callsigns are raw text here; each
/// handler normalizes and validates its own input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    Open {
        callsign: String,
    },
    Select {
        callsign: String,
    },
    Remove {
        callsign: String,
    },
    Send {
        #[serde(default)]
        to: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        path: Option<String>,
    },
    RequestLocation {
        callsign: String,
    },
}

impl UserAction {
    pub fn name(&self) -> &'static str {
        match self {
            UserAction::Open { .. } => "open",
            UserAction::Select { .. } => "select",
            UserAction::Remove { .. } => "remove",
            UserAction::Send { .. } => "send",
            UserAction::RequestLocation { .. } => "request_location",
        }
    }
}

/// Tell the view an action was refused and why.
pub(crate) fn reject(action: &UserAction, reason: String, sink: &mut dyn RenderSink) {
    sink.emit(RenderInstruction::CommandRejected(RejectedPayload {
        action: action.name().to_string(),
        reason,
    }));
}
