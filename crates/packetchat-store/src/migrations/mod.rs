//! Schema migrations, tracked with `PRAGMA user_version`.
//!
//! [`MIGRATIONS`] lists every step in version order.  Opening a store applies
//! the steps above the file's recorded version, each in its own transaction
//! together with the version bump.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> std::result::Result<(), rusqlite::Error>;

const MIGRATIONS: &[(u32, &str, Step)] = &[(1, "v001_initial", v001_initial::up as Step)];

pub const CURRENT_VERSION: u32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "store is at schema version {current}, newer than supported {CURRENT_VERSION}"
        )));
    }

    for &(version, name, step) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(from = current, to = version, name, "migrating session store");
        conn.execute_batch("BEGIN")?;
        let applied = step(conn).and_then(|()| conn.pragma_update(None, "user_version", version));
        match applied {
            Ok(()) => conn.execute_batch("COMMIT")?,
            Err(e) => {
                if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                    tracing::error!(error = %rollback, "rollback after failed migration");
                }
                return Err(StoreError::Migration(format!("{name}: {e}")));
            }
        }
    }

    Ok(())
}
