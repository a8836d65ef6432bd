use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

const DEFAULT_DB_PATH: &str = "medq.db";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where the store lives and how long a call may wait on a locked database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Reads `MEDQ_DB_PATH` and `MEDQ_DB_BUSY_TIMEOUT_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        let path = std::env::var("MEDQ_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into());

        let busy_timeout_ms = match std::env::var("MEDQ_DB_BUSY_TIMEOUT_MS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "MEDQ_DB_BUSY_TIMEOUT_MS={} is not a valid integer, using {}",
                    raw, DEFAULT_BUSY_TIMEOUT_MS
                );
                DEFAULT_BUSY_TIMEOUT_MS
            }),
            Err(_) => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Self {
            path: PathBuf::from(path),
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        }
    }
}
