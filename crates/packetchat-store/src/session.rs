//! Session persistence.
//!
//! The session is written as three JSON documents under the keys in
//! [`packetchat_shared::constants`].  Saves are synchronous and atomic across
//! all three keys.  Loads never fail: a missing, unreadable or mistyped
//! document is replaced by its empty value and the rest of the session is
//! still restored.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use packetchat_shared::constants::{KEY_CALLSIGN_LIST, KEY_CALLSIGN_LOCATION, KEY_MESSAGE_LIST};
use packetchat_shared::{Callsign, MessageId};

use crate::database::Database;
use crate::error::Result;
use crate::models::{LocationRecord, Message, SessionSnapshot, ThreadRecord};

/// Sole writer of the durable session documents.
pub struct SessionPersistence {
    db: Database,
}

impl SessionPersistence {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Serialize the full snapshot and write it in one transaction.
    pub fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        let threads = serde_json::to_string(&snapshot.threads)?;
        let messages = serde_json::to_string(&snapshot.messages)?;
        let locations = serde_json::to_string(&snapshot.locations)?;

        self.db.set_values(&[
            (KEY_CALLSIGN_LIST, threads),
            (KEY_MESSAGE_LIST, messages),
            (KEY_CALLSIGN_LOCATION, locations),
        ])?;

        debug!(
            threads = snapshot.threads.len(),
            locations = snapshot.locations.len(),
            "session saved"
        );
        Ok(())
    }

    /// Read the snapshot back.  Never fails; see the module docs.
    pub fn load(&self) -> SessionSnapshot {
        let threads: Vec<ThreadRecord> = self.read_document(KEY_CALLSIGN_LIST);
        let messages: BTreeMap<Callsign, BTreeMap<MessageId, Message>> =
            self.read_document(KEY_MESSAGE_LIST);
        let locations: BTreeMap<Callsign, LocationRecord> =
            self.read_document(KEY_CALLSIGN_LOCATION);

        SessionSnapshot {
            threads,
            messages,
            locations,
        }
        .normalize()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn read_document<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.db.get_value(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored document, starting empty");
                return T::default();
            }
            Err(e) => {
                error!(key, error = %e, "failed to read stored document, starting empty");
                return T::default();
            }
        };

        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "corrupt stored document, starting empty");
                T::default()
            }
        }
    }
}
