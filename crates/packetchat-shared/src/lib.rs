//! # packetchat-shared
//!
//! Primitives shared by the store and the client engine: normalized
//! callsigns, timestamp-derived message identifiers, the inbound push-event
//! shapes and the outbound commands submitted back to the channel.

pub mod codec;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::EventError;
pub use types::{Callsign, Direction, MessageId};
