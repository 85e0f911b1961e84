//! # packetchat-client
//!
//! Conversation engine for the packetchat console: thread registry, message
//! store, ack tracking, unread counts and location cache, driven by push
//! events and operator actions and rendered as a stream of instructions.

pub mod acks;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod ingest;
pub mod locations;
pub mod messages;
pub mod notifications;
pub mod state;
pub mod threads;

pub use error::ClientError;
pub use state::{ChatSession, SessionPhase};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.  `RUST_LOG` wins over the built-in filter.
/// Logs go to stderr; stdout carries the render stream.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("packetchat=debug,packetchat_client=debug,packetchat_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
