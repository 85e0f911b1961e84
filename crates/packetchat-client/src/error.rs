use thiserror::Error;

use packetchat_shared::{Callsign, EventError};
use packetchat_store::StoreError;

/// Errors surfaced by user commands and the console front end.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("You must enter a callsign to send a message")]
    MissingRecipient,

    #[error("You must enter a message to send")]
    EmptyMessage,

    #[error("Invalid callsign: {0}")]
    InvalidCallsign(#[from] EventError),

    #[error("Unknown thread: {0}")]
    UnknownThread(Callsign),

    #[error("Malformed console input: {0}")]
    Input(#[from] serde_json::Error),

    #[error("Push channel closed")]
    ChannelClosed,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
