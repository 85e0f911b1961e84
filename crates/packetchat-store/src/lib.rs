//! # packetchat-store
//!
//! Durable client-side storage for the chat console, backed by SQLite.
//!
//! The database is used as a small key-value store: the session is split
//! across three top-level JSON documents (thread list, per-thread messages,
//! location cache).  [`SessionPersistence`] writes all three in one
//! transaction after every mutating operation and reads them back, fail-soft,
//! at startup.

pub mod database;
pub mod kv;
pub mod migrations;
pub mod models;
pub mod session;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use session::SessionPersistence;
