use tracing::info;

use packetchat_shared::Callsign;

use crate::error::ClientError;
use crate::events::RenderSink;
use crate::state::ChatSession;

/// Open a conversation with a peer, creating it if needed, and focus it.
pub fn open_thread(
    session: &mut ChatSession,
    callsign: &str,
    sink: &mut dyn RenderSink,
) -> Result<Callsign, ClientError> {
    let callsign = Callsign::parse(callsign)?;
    if session.ensure_thread(&callsign, sink) {
        info!(callsign = %callsign, "thread opened");
        session.persist();
    }
    session.select(&callsign, sink);
    Ok(callsign)
}

pub fn select_thread(
    session: &mut ChatSession,
    callsign: &str,
    sink: &mut dyn RenderSink,
) -> Result<Callsign, ClientError> {
    let callsign = Callsign::parse(callsign)?;
    if !session.select(&callsign, sink) {
        return Err(ClientError::UnknownThread(callsign));
    }
    Ok(callsign)
}

/// Delete a conversation and everything stored for it.
pub fn remove_thread(
    session: &mut ChatSession,
    callsign: &str,
    sink: &mut dyn RenderSink,
) -> Result<Callsign, ClientError> {
    let callsign = Callsign::parse(callsign)?;
    if !session.remove(&callsign, sink) {
        return Err(ClientError::UnknownThread(callsign));
    }
    info!(callsign = %callsign, "thread removed");
    Ok(callsign)
}

#[cfg(test)]
mod tests {
    use packetchat_store::{Database, SessionPersistence};

    use super::*;
    use crate::events::*;

    fn session() -> ChatSession {
        let db = Database::open_in_memory().unwrap();
        ChatSession::restore(SessionPersistence::new(db), None)
    }

    #[test]
    fn test_open_creates_once_and_focuses() {
        let mut session = session();
        let mut sink = Vec::new();

        open_thread(&mut session, "ki5abc", &mut sink).unwrap();
        open_thread(&mut session, "W1AW", &mut sink).unwrap();
        open_thread(&mut session, "KI5ABC", &mut sink).unwrap();

        assert_eq!(session.threads().len(), 2);
        assert_eq!(
            session.threads().focused(),
            Some(&Callsign::parse("KI5ABC").unwrap())
        );
        assert_eq!(session.snapshot().threads.len(), 2);
        let created = sink
            .iter()
            .filter(|i| i.name() == EVENT_THREAD_CREATED)
            .count();
        assert_eq!(created, 2);
    }

    #[test]
    fn test_unknown_thread_rejected() {
        let mut session = session();
        let mut sink = Vec::new();

        assert!(matches!(
            select_thread(&mut session, "NOBODY", &mut sink),
            Err(ClientError::UnknownThread(_))
        ));
        assert!(matches!(
            remove_thread(&mut session, "NOBODY", &mut sink),
            Err(ClientError::UnknownThread(_))
        ));
        assert!(matches!(
            open_thread(&mut session, "", &mut sink),
            Err(ClientError::InvalidCallsign(_))
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_remove_last_thread_clears_focus() {
        let mut session = session();
        let mut sink = Vec::new();
        open_thread(&mut session, "KI5ABC", &mut sink).unwrap();
        sink.clear();

        remove_thread(&mut session, "KI5ABC", &mut sink).unwrap();
        assert!(session.threads().is_empty());
        assert_eq!(session.threads().focused(), None);
        assert_eq!(
            sink,
            vec![
                RenderInstruction::ThreadRemoved(CallsignPayload {
                    callsign: Callsign::parse("KI5ABC").unwrap(),
                }),
                RenderInstruction::FocusChanged(FocusPayload {
                    callsign: None,
                    path: None,
                }),
            ]
        );
    }
}
