//! Console configuration loaded from environment variables.
//!
//! Every setting has a default so the console starts with no configuration.

use std::path::PathBuf;

use packetchat_shared::constants::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_PACKET_PATH};
use packetchat_shared::Callsign;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// SQLite file holding the session.
    /// Env: `PACKETCHAT_DB_PATH`
    /// Default: `packetchat.db` in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Callsign the server is logged in as.
    /// Env: `PACKETCHAT_CALLSIGN`
    pub own_callsign: Option<Callsign>,

    /// Routing path for sends that name none.
    /// Env: `PACKETCHAT_DEFAULT_PATH`
    /// Default: `WIDE1-1,WIDE2-1`
    pub default_path: String,

    /// Bound of the bridge input and outbound command channels.
    /// Env: `PACKETCHAT_CHANNEL_CAPACITY`
    /// Default: `256`
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            own_callsign: None,
            default_path: DEFAULT_PACKET_PATH.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = var("PACKETCHAT_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = var("PACKETCHAT_CALLSIGN") {
            match Callsign::parse(&raw) {
                Ok(callsign) => config.own_callsign = Some(callsign),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid PACKETCHAT_CALLSIGN, ignoring");
                }
            }
        }

        if let Some(path) = var("PACKETCHAT_DEFAULT_PATH") {
            config.default_path = path.trim().to_string();
        }

        if let Some(raw) = var("PACKETCHAT_CHANNEL_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.channel_capacity = n,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "Invalid PACKETCHAT_CHANNEL_CAPACITY, using default"
                    );
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(load(&[]), ClientConfig::default());
        assert_eq!(ClientConfig::default().default_path, "WIDE1-1,WIDE2-1");
        assert_eq!(ClientConfig::default().channel_capacity, 256);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PACKETCHAT_DB_PATH", "/tmp/chat.db"),
            ("PACKETCHAT_CALLSIGN", "n0call-9"),
            ("PACKETCHAT_DEFAULT_PATH", "WIDE2-2"),
            ("PACKETCHAT_CHANNEL_CAPACITY", "32"),
        ]);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/chat.db")));
        assert_eq!(config.own_callsign.unwrap().as_str(), "N0CALL-9");
        assert_eq!(config.default_path, "WIDE2-2");
        assert_eq!(config.channel_capacity, 32);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[
            ("PACKETCHAT_CALLSIGN", "   "),
            ("PACKETCHAT_CHANNEL_CAPACITY", "0"),
        ]);
        assert_eq!(config.own_callsign, None);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);

        let config = load(&[("PACKETCHAT_CHANNEL_CAPACITY", "lots")]);
        assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    }
}
