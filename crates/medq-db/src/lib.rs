pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod sync;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rusqlite::Connection;
use tracing::{error, info};

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};

/// Handle to the relational store.
///
/// Every operation opens its own connection, runs one statement and drops
/// the connection again, so clones of a gateway share nothing but the
/// config and the schema flag.
#[derive(Clone)]
pub struct StoreGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: StoreConfig,
    schema_ready: AtomicBool,
}

impl StoreGateway {
    /// Builds the handle and bootstraps the schema.
    ///
    /// A failed bootstrap is logged and leaves the gateway degraded: calls
    /// fail individually until a later `ensure_schema` succeeds.
    pub fn connect(config: StoreConfig) -> Self {
        let gateway = Self {
            inner: Arc::new(GatewayInner {
                config,
                schema_ready: AtomicBool::new(false),
            }),
        };

        match gateway.ensure_schema() {
            Ok(()) => info!("Store opened at {}", gateway.inner.config.path.display()),
            Err(e) => error!(
                "Can't create tables in {}: {}",
                gateway.inner.config.path.display(),
                e
            ),
        }

        gateway
    }

    /// Runs the schema bootstrap unless a previous run already succeeded.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        if self.is_ready() {
            return Ok(());
        }

        let conn = self.open_connection()?;
        migrations::run(&conn)?;
        self.inner.schema_ready.store(true, Ordering::Release);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.schema_ready.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Opens a fresh connection; it closes when dropped.
    pub fn open_connection(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.inner.config.path)?;

        conn.busy_timeout(self.inner.config.busy_timeout)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(conn)
    }

    /// Runs `f` against a fresh connection, bootstrapping the schema first if needed.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        self.ensure_schema()?;
        let conn = self.open_connection()?;
        f(&conn)
    }

    /// Like `with_conn`, for closures that need `conn.transaction()`.
    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        self.ensure_schema()?;
        let mut conn = self.open_connection()?;
        f(&mut conn)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{StoreConfig, StoreGateway};
    use tempfile::TempDir;

    /// A gateway over a throwaway database file. Keep the `TempDir` alive for
    /// as long as the gateway is used.
    pub fn temp_gateway() -> (TempDir, StoreGateway) {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StoreGateway::connect(StoreConfig::new(dir.path().join("medq.db")));
        (dir, gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_gateway;

    fn table_count(gateway: &StoreGateway) -> i64 {
        gateway
            .with_conn(|conn| {
                let n = conn.query_row(
                    "SELECT count(*) FROM sqlite_master
                     WHERE type = 'table' AND name IN ('users', 'messages')",
                    [],
                    |row| row.get(0),
                )?;
                Ok(n)
            })
            .unwrap()
    }

    #[test]
    fn connect_creates_both_tables() {
        let (_dir, gateway) = temp_gateway();
        assert!(gateway.is_ready());
        assert_eq!(table_count(&gateway), 2);
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let (dir, gateway) = temp_gateway();
        assert!(gateway.insert_message("alice", "hello", false));

        // A second handle over the same file re-runs CREATE IF NOT EXISTS.
        let again = StoreGateway::connect(StoreConfig::new(dir.path().join("medq.db")));
        assert!(again.is_ready());
        assert_eq!(table_count(&again), 2);
        assert_eq!(again.get_queue(0).len(), 1);
    }

    #[test]
    fn degraded_start_heals_once_store_is_reachable() {
        let dir = tempfile::tempdir().unwrap();
        let db_dir = dir.path().join("not-yet");
        let gateway = StoreGateway::connect(StoreConfig::new(db_dir.join("medq.db")));

        assert!(!gateway.is_ready());
        assert!(!gateway.insert_message("alice", "hello", false));
        assert!(gateway.get_queue(0).is_empty());
        assert!(gateway.get_user("alice").is_none());

        std::fs::create_dir_all(&db_dir).unwrap();

        assert!(gateway.insert_message("alice", "hello", false));
        assert!(gateway.is_ready());
        assert_eq!(gateway.get_queue(0).len(), 1);
    }

    #[test]
    fn every_connection_gets_the_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::new(dir.path().join("medq.db"));
        config.busy_timeout = std::time::Duration::from_millis(1234);
        let gateway = StoreGateway::connect(config);

        let conn = gateway.open_connection().unwrap();
        let journal: String = conn.query_row("PRAGMA journal_mode", [], |r| r.get(0)).unwrap();
        let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0)).unwrap();
        let busy_timeout: i64 = conn.query_row("PRAGMA busy_timeout", [], |r| r.get(0)).unwrap();

        assert_eq!(journal.to_lowercase(), "wal");
        assert_eq!(foreign_keys, 1);
        assert_eq!(busy_timeout, 1234);
    }

    #[test]
    fn clones_share_schema_state() {
        let (_dir, gateway) = temp_gateway();
        let clone = gateway.clone();
        assert!(clone.is_ready());
        assert!(clone.insert_message("bob", "hi", false));
        assert_eq!(gateway.get_new_messages("bob", 0).len(), 1);
    }
}
