//! Key-value access to the `kv_store` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Fetch the raw document stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a single document.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Write several documents atomically: either all land or none do.
    pub fn set_values(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn_mut().transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            )?;
            for (key, value) in entries {
                stmt.execute(params![key, value, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_replace() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value("missing").unwrap(), None);

        db.set_value("k", "{}").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("{}"));

        db.set_value("k", "[]").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_values_batch() {
        let mut db = Database::open_in_memory().unwrap();
        db.set_values(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(db.get_value("a").unwrap().as_deref(), Some("1"));
        assert_eq!(db.get_value("b").unwrap().as_deref(), Some("2"));
    }
}
