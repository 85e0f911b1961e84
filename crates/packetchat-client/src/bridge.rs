//! Push-channel bridge.
//!
//! Receives inbound frames and operator actions on one channel and applies
//! them to the session strictly in arrival order.  When every sender is gone
//! the session is flushed and the loop returns.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use packetchat_shared::protocol::OutboundCommand;

use crate::commands::{self, location, messaging, UserAction};
use crate::error::ClientError;
use crate::events::RenderSink;
use crate::state::ChatSession;

/// One unit of work for the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeInput {
    /// Raw push-channel event, decoded by the session.
    Frame(String),
    Action(UserAction),
}

impl BridgeInput {
    /// Classify a console line.  Objects with an `action` key are operator
    /// actions; anything else is handed on as a push frame.  Blank lines
    /// yield `None`.
    pub fn from_line(line: &str) -> Result<Option<Self>, ClientError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(line)?;
        if value.get("action").is_some() {
            let action = serde_json::from_value(value)?;
            return Ok(Some(BridgeInput::Action(action)));
        }
        Ok(Some(BridgeInput::Frame(line.to_string())))
    }
}

pub async fn run_bridge(
    mut session: ChatSession,
    mut input_rx: mpsc::Receiver<BridgeInput>,
    cmd_tx: mpsc::Sender<OutboundCommand>,
    sink: &mut dyn RenderSink,
    default_path: &str,
) {
    info!("bridge started");

    while let Some(input) = input_rx.recv().await {
        match input {
            BridgeInput::Frame(frame) => {
                session.handle_frame(&frame, sink);
            }
            BridgeInput::Action(action) => {
                debug!(action = action.name(), "handling action");
                if let Err(e) = apply_action(&mut session, &action, &cmd_tx, sink, default_path).await {
                    warn!(action = action.name(), error = %e, "action rejected");
                    commands::reject(&action, e.to_string(), sink);
                }
            }
        }
    }

    info!("bridge input closed");
    session.shutdown();
}

async fn apply_action(
    session: &mut ChatSession,
    action: &UserAction,
    cmd_tx: &mpsc::Sender<OutboundCommand>,
    sink: &mut dyn RenderSink,
    default_path: &str,
) -> Result<(), ClientError> {
    match action {
        UserAction::Open { callsign } => {
            commands::threads::open_thread(session, callsign, sink)?;
        }
        UserAction::Select { callsign } => {
            commands::threads::select_thread(session, callsign, sink)?;
        }
        UserAction::Remove { callsign } => {
            commands::threads::remove_thread(session, callsign, sink)?;
        }
        UserAction::Send { to, text, path } => {
            messaging::send_message(cmd_tx, to, text, path.as_deref(), default_path).await?;
        }
        UserAction::RequestLocation { callsign } => {
            location::request_location(session, cmd_tx, callsign, sink).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use packetchat_shared::{Callsign, MessageId};
    use packetchat_store::{Database, SessionPersistence};

    use super::*;
    use crate::events::*;

    #[test]
    fn test_line_classification() {
        assert_eq!(BridgeInput::from_line("   ").unwrap(), None);
        assert_eq!(
            BridgeInput::from_line(r#"{"action":"open","callsign":"W1AW"}"#).unwrap(),
            Some(BridgeInput::Action(UserAction::Open {
                callsign: "W1AW".into()
            }))
        );
        assert!(matches!(
            BridgeInput::from_line(r#"{"kind":"ack","to":"W1AW","msgId":1}"#).unwrap(),
            Some(BridgeInput::Frame(_))
        ));
        assert!(BridgeInput::from_line("{oops").is_err());
        assert!(BridgeInput::from_line(r#"{"action":"fly"}"#).is_err());
    }

    #[tokio::test]
    async fn test_bridge_processes_in_order_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");
        let session = ChatSession::restore(
            SessionPersistence::new(Database::open_at(&path).unwrap()),
            None,
        );

        let (input_tx, input_rx) = mpsc::channel(16);
        let (cmd_tx, mut cmd_rx) = mpsc::channel(16);

        let lines = [
            r#"{"action":"send","to":"W1AW","text":"hello"}"#,
            r#"{"kind":"sent","from":"N0CALL","to":"W1AW","text":"hello","ts":1700000000}"#,
            r#"{"kind":"ack","to":"W1AW","msgId":1700000000}"#,
            r#"{"action":"send","to":"","text":"x"}"#,
            r#"{"kind":"received"}"#,
        ];
        for line in lines {
            let input = BridgeInput::from_line(line).unwrap().unwrap();
            input_tx.send(input).await.unwrap();
        }
        drop(input_tx);

        let mut sink: Vec<RenderInstruction> = Vec::new();
        run_bridge(session, input_rx, cmd_tx, &mut sink, "WIDE1-1,WIDE2-1").await;

        match cmd_rx.recv().await.unwrap() {
            OutboundCommand::Send { to, path, .. } => {
                assert_eq!(to.as_str(), "W1AW");
                assert_eq!(path.as_deref(), Some("WIDE1-1,WIDE2-1"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(sink.contains(&RenderInstruction::AckUpdated(MessageKeyPayload {
            callsign: Callsign::parse("W1AW").unwrap(),
            id: MessageId(1_700_000_000),
        })));
        assert_eq!(
            sink.last(),
            Some(&RenderInstruction::CommandRejected(RejectedPayload {
                action: "send".into(),
                reason: "You must enter a callsign to send a message".into(),
            }))
        );

        let restored = ChatSession::restore(
            SessionPersistence::new(Database::open_at(&path).unwrap()),
            None,
        );
        let w1aw = Callsign::parse("W1AW").unwrap();
        assert!(restored.messages().get(&w1aw, MessageId(1_700_000_000)).unwrap().ack);
    }
}
