use tokio::sync::mpsc;
use tracing::info;

use packetchat_shared::protocol::OutboundCommand;
use packetchat_shared::Callsign;

use crate::error::ClientError;
use crate::events::{CallsignPayload, RenderInstruction, RenderSink};
use crate::state::ChatSession;

/// Ask the server for a peer's position.  The request stays pending until a
/// location event for that peer arrives.
pub async fn request_location(
    session: &mut ChatSession,
    cmd_tx: &mpsc::Sender<OutboundCommand>,
    callsign: &str,
    sink: &mut dyn RenderSink,
) -> Result<Callsign, ClientError> {
    let callsign = Callsign::parse(callsign)?;

    cmd_tx
        .send(OutboundCommand::RequestLocation {
            callsign: callsign.clone(),
        })
        .await
        .map_err(|_| ClientError::ChannelClosed)?;

    session.locations.mark_requested(callsign.clone());
    sink.emit(RenderInstruction::LocationRequested(CallsignPayload {
        callsign: callsign.clone(),
    }));
    info!(callsign = %callsign, "location requested");
    Ok(callsign)
}

#[cfg(test)]
mod tests {
    use packetchat_store::{Database, SessionPersistence};

    use super::*;
    use crate::events::EVENT_LOCATION_REQUESTED;

    #[tokio::test]
    async fn test_request_marks_pending_until_answer() {
        let db = Database::open_in_memory().unwrap();
        let mut session = ChatSession::restore(SessionPersistence::new(db), None);
        let (tx, mut rx) = mpsc::channel(4);
        let mut sink = Vec::new();

        let peer = request_location(&mut session, &tx, "ki5abc", &mut sink)
            .await
            .unwrap();
        assert!(session.locations().is_pending(&peer));
        assert_eq!(sink[0].name(), EVENT_LOCATION_REQUESTED);
        assert_eq!(
            rx.recv().await.unwrap(),
            OutboundCommand::RequestLocation {
                callsign: peer.clone()
            }
        );

        let frame = r#"{"kind":"location","callsign":"KI5ABC","lat":30.5,"lon":-97.75}"#;
        session.handle_frame(frame, &mut sink);
        assert!(!session.locations().is_pending(&peer));
    }
}
