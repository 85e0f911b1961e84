use thiserror::Error;

/// Reasons an inbound push event is rejected before dispatch.
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Callsign must not be empty")]
    EmptyCallsign,

    #[error("Callsign too long: {0}")]
    CallsignTooLong(String),
}
