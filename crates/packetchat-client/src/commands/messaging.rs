use tokio::sync::mpsc;
use tracing::info;

use packetchat_shared::protocol::OutboundCommand;
use packetchat_shared::Callsign;

use crate::error::ClientError;

/// Submit a message for transmission.
///
/// Nothing is added to the session here; the message shows up once the
/// server echoes it back as a "sent" event.  An empty `path` falls back to
/// `default_path`.
pub async fn send_message(
    cmd_tx: &mpsc::Sender<OutboundCommand>,
    to: &str,
    text: &str,
    path: Option<&str>,
    default_path: &str,
) -> Result<OutboundCommand, ClientError> {
    if to.trim().is_empty() {
        return Err(ClientError::MissingRecipient);
    }
    if text.trim().is_empty() {
        return Err(ClientError::EmptyMessage);
    }
    let to = Callsign::parse(to)?;

    let path = path
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(default_path)
        .to_string();
    let path = (!path.is_empty()).then_some(path);

    let command = OutboundCommand::Send {
        to: to.clone(),
        text: text.to_string(),
        path: path.clone(),
    };
    cmd_tx
        .send(command.clone())
        .await
        .map_err(|_| ClientError::ChannelClosed)?;

    info!(to = %to, path = ?path, len = text.len(), "message submitted");
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "WIDE1-1,WIDE2-1";

    #[tokio::test]
    async fn test_send_validates_and_submits() {
        let (tx, mut rx) = mpsc::channel(4);

        let err = send_message(&tx, "  ", "hi", None, DEFAULT).await.unwrap_err();
        assert_eq!(err.to_string(), "You must enter a callsign to send a message");
        let err = send_message(&tx, "KI5ABC", "", None, DEFAULT).await.unwrap_err();
        assert_eq!(err.to_string(), "You must enter a message to send");
        assert!(matches!(
            send_message(&tx, "WAYTOOLONGCALL", "hi", None, DEFAULT).await,
            Err(ClientError::InvalidCallsign(_))
        ));

        send_message(&tx, "ki5abc", "hello", Some(" "), DEFAULT)
            .await
            .unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            OutboundCommand::Send {
                to: Callsign::parse("KI5ABC").unwrap(),
                text: "hello".into(),
                path: Some(DEFAULT.into()),
            }
        );

        send_message(&tx, "KI5ABC", "again", Some("WIDE2-2"), DEFAULT)
            .await
            .unwrap();
        match rx.recv().await.unwrap() {
            OutboundCommand::Send { path, .. } => assert_eq!(path.as_deref(), Some("WIDE2-2")),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(matches!(
            send_message(&tx, "KI5ABC", "hi", None, DEFAULT).await,
            Err(ClientError::ChannelClosed)
        ));
    }
}
