//! SQLite handle for the session store.
//!
//! Opening a [`Database`] always brings the schema up to
//! [`migrations::CURRENT_VERSION`] first, so callers never see an unmigrated
//! file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use rusqlite::Connection;

use packetchat_shared::constants::APP_NAME;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Another console sharing the file may hold the write lock briefly.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Session store location in the platform data directory, e.g.
    /// `~/.local/share/packetchat/packetchat.db` on Linux.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", APP_NAME, APP_NAME).ok_or(StoreError::NoDataDir)?;
        Ok(dirs.data_dir().join(format!("{APP_NAME}.db")))
    }

    /// Open or create the store at `path`, creating missing parent
    /// directories.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::info!(path = %path.display(), "opening session store");

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Open the store at `path`, starting over if the file is unusable.
    ///
    /// A damaged file, or one written by a newer schema, is moved aside to
    /// `<name>.corrupt` (with its WAL sidecars) and a fresh store is created
    /// in its place.  If that fails too the session runs from memory.
    pub fn open_or_reset(path: &Path) -> Result<Self> {
        let err = match Self::open_at(path) {
            Ok(db) => return Ok(db),
            Err(e) => e,
        };
        tracing::warn!(path = %path.display(), error = %err, "session store unusable, starting fresh");

        match quarantine(path) {
            Ok(moved) => {
                tracing::warn!(to = %moved.display(), "damaged session store moved aside");
                match Self::open_at(path) {
                    Ok(db) => return Ok(db),
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "cannot recreate session store");
                    }
                }
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot move damaged session store");
            }
        }

        tracing::error!("session will not survive a restart, using an in-memory store");
        Self::open_in_memory()
    }

    /// Store that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Needed for transactions.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// File backing the store; `None` for in-memory stores.
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

/// Rename `path` and its `-wal`/`-shm` sidecars to `<name>.corrupt*`.
/// Returns the new location of the main file.
fn quarantine(path: &Path) -> std::io::Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| APP_NAME.to_string());
    let moved = path.with_file_name(format!("{name}.corrupt"));

    if path.exists() {
        std::fs::rename(path, &moved)?;
    }
    for suffix in ["-wal", "-shm"] {
        let sidecar = path.with_file_name(format!("{name}{suffix}"));
        if sidecar.exists() {
            std::fs::rename(&sidecar, path.with_file_name(format!("{name}.corrupt{suffix}")))?;
        }
    }
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        std::fs::write(&path, [0x5au8; 80]).unwrap();
        assert!(Database::open_at(&path).is_err());

        let db = Database::open_or_reset(&path).unwrap();
        assert!(db.path().is_some());
        assert_ne!(std::fs::read(&path).unwrap(), vec![0x5au8; 80]);
        assert_eq!(
            std::fs::read(dir.path().join("chat.db.corrupt")).unwrap(),
            vec![0x5au8; 80]
        );

        db.set_value("k", "v").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_newer_schema_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.conn()
                .pragma_update(None, "user_version", migrations::CURRENT_VERSION + 98)
                .unwrap();
        }
        assert!(matches!(
            Database::open_at(&path),
            Err(StoreError::Migration(_))
        ));

        let db = Database::open_or_reset(&path).unwrap();
        let version: u32 = db
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, migrations::CURRENT_VERSION);
        assert!(dir.path().join("chat.db.corrupt").exists());
    }

    #[test]
    fn test_healthy_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        Database::open_at(&path).unwrap().set_value("k", "v").unwrap();

        let db = Database::open_or_reset(&path).unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("v"));
        assert!(!dir.path().join("chat.db.corrupt").exists());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chat.db");

        let db = Database::open_at(&path).unwrap();
        assert!(path.exists());
        assert!(db.path().is_some());
    }

    #[test]
    fn test_reopen_is_at_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");

        drop(Database::open_at(&path).unwrap());
        let db = Database::open_at(&path).unwrap();
        let version: u32 = db
            .conn()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, migrations::CURRENT_VERSION);
    }
}
