//! Runtime configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                       | Default      |
//! |--------------------------------|--------------|
//! | `KASIR_DATABASE_PATH`          | `./kasir.db` |
//! | `KASIR_MAX_CONNECTIONS`        | `5`          |
//! | `KASIR_BUSY_TIMEOUT_MS`        | `5000`       |
//! | `KASIR_OPERATION_TIMEOUT_SECS` | `30`         |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Kasir backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KasirConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for the SQLite write lock, in milliseconds
    pub busy_timeout_ms: u64,

    /// Deadline for a single checkout or report call, in seconds
    pub operation_timeout_secs: u64,
}

impl KasirConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = KasirConfig {
            database_path: lookup("KASIR_DATABASE_PATH")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "./kasir.db".to_string())
                .into(),

            max_connections: lookup("KASIR_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KASIR_MAX_CONNECTIONS".to_string()))?,

            busy_timeout_ms: lookup("KASIR_BUSY_TIMEOUT_MS")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KASIR_BUSY_TIMEOUT_MS".to_string()))?,

            operation_timeout_secs: lookup("KASIR_OPERATION_TIMEOUT_SECS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("KASIR_OPERATION_TIMEOUT_SECS".to_string()))?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("KASIR_MAX_CONNECTIONS".to_string()));
        }
        if config.operation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("KASIR_OPERATION_TIMEOUT_SECS".to_string()));
        }

        Ok(config)
    }

    /// Pool settings for [`Database::new`](crate::Database::new).
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    /// Deadline to pass to `checkout_with_deadline` and friends.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = KasirConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from("./kasir.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.operation_timeout(), Duration::from_secs(30));

        let db = config.db_config();
        assert_eq!(db.busy_timeout, Duration::from_millis(5000));
        assert_eq!(db.max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = KasirConfig::from_lookup(lookup(&[
            ("KASIR_DATABASE_PATH", "/srv/kasir/kasir.db"),
            ("KASIR_MAX_CONNECTIONS", "12"),
            ("KASIR_BUSY_TIMEOUT_MS", "250"),
            ("KASIR_OPERATION_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/kasir/kasir.db"));
        assert_eq!(config.db_config().max_connections, 12);
        assert_eq!(config.db_config().busy_timeout, Duration::from_millis(250));
        assert_eq!(config.operation_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        let err = KasirConfig::from_lookup(lookup(&[("KASIR_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for KASIR_MAX_CONNECTIONS");

        assert!(KasirConfig::from_lookup(lookup(&[("KASIR_MAX_CONNECTIONS", "0")])).is_err());
        assert!(KasirConfig::from_lookup(lookup(&[("KASIR_OPERATION_TIMEOUT_SECS", "-1")])).is_err());
    }
}
