//! Scoped connection handling
//!
//! Every catalog, profiling, DDL and reclaim call goes through a
//! [`ScopedConnection`] obtained from a [`ConnectionSource`]. The guard hands
//! the connection back to its source when dropped, whichever way the caller
//! leaves the scope.

use crate::config::PoolConfig;
use crate::{Error, Result};
use parking_lot::{Condvar, Mutex};
use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Anything that can lend out a database connection for one scope
pub trait ConnectionSource: Send + Sync {
    fn acquire(&self) -> Result<ScopedConnection<'_>>;

    /// Most connections that can be held at once
    fn max_concurrency(&self) -> usize;
}

/// A borrowed connection that is released when dropped
pub struct ScopedConnection<'a> {
    conn: Option<Connection>,
    release: Option<Box<dyn FnOnce(Connection) + 'a>>,
}

impl<'a> ScopedConnection<'a> {
    pub fn new(conn: Connection, release: impl FnOnce(Connection) + 'a) -> Self {
        Self {
            conn: Some(conn),
            release: Some(Box::new(release)),
        }
    }
}

impl Deref for ScopedConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in Drop.
        self.conn.as_ref().unwrap_or_else(|| unreachable!("connection already released"))
    }
}

impl Drop for ScopedConnection<'_> {
    fn drop(&mut self) {
        if let (Some(conn), Some(release)) = (self.conn.take(), self.release.take()) {
            release(conn);
        }
    }
}

#[derive(Debug, Clone)]
enum PoolTarget {
    File(PathBuf),
    Memory,
}

struct PoolState {
    idle: Vec<Connection>,
    created: usize,
}

/// Bounded SQLite connection pool
pub struct SqlitePool {
    target: PoolTarget,
    config: PoolConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl std::fmt::Debug for SqlitePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SqlitePool")
            .field("target", &self.target)
            .field("max_connections", &self.config.max_connections)
            .field("created", &state.created)
            .field("idle", &state.idle.len())
            .finish()
    }
}

impl SqlitePool {
    /// Pool over a database file. The file must already exist.
    pub fn open(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("database not found: {}", path.display()),
            )));
        }
        let pool = Self::with_target(PoolTarget::File(path), config);
        // Fail fast on an unreadable file instead of at first acquire.
        drop(pool.acquire()?);
        Ok(pool)
    }

    /// Pool over a private in-memory database, backed by one shared connection
    pub fn open_in_memory() -> Result<Self> {
        let config = PoolConfig {
            max_connections: 1,
            ..PoolConfig::default()
        };
        let pool = Self::with_target(PoolTarget::Memory, config);
        drop(pool.acquire()?);
        Ok(pool)
    }

    fn with_target(target: PoolTarget, config: PoolConfig) -> Self {
        Self {
            target,
            config,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                created: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Connections opened so far
    pub fn created_connections(&self) -> usize {
        self.state.lock().created
    }

    /// Connections currently idle in the pool
    pub fn idle_connections(&self) -> usize {
        self.state.lock().idle.len()
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.target {
            PoolTarget::File(path) => Connection::open(path)?,
            PoolTarget::Memory => Connection::open_in_memory()?,
        };
        conn.busy_timeout(self.config.busy_timeout())?;
        if let PoolTarget::File(_) = self.target {
            let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            debug!("Opened connection (journal_mode={})", mode);
        }
        conn.execute_batch("PRAGMA synchronous=NORMAL; PRAGMA temp_store=MEMORY;")?;
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        self.state.lock().idle.push(conn);
        self.available.notify_one();
    }
}

impl ConnectionSource for SqlitePool {
    fn max_concurrency(&self) -> usize {
        self.config.max_connections
    }

    fn acquire(&self) -> Result<ScopedConnection<'_>> {
        let deadline = Instant::now() + self.config.connection_timeout();
        let mut state = self.state.lock();

        loop {
            if let Some(conn) = state.idle.pop() {
                return Ok(ScopedConnection::new(conn, move |c| self.release(c)));
            }

            if state.created < self.config.max_connections {
                state.created += 1;
                drop(state);
                return match self.connect() {
                    Ok(conn) => Ok(ScopedConnection::new(conn, move |c| self.release(c))),
                    Err(e) => {
                        self.state.lock().created -= 1;
                        self.available.notify_one();
                        Err(e)
                    }
                };
            }

            if self.available.wait_until(&mut state, deadline).timed_out() && state.idle.is_empty() {
                return Err(Error::ConnectionTimeout(self.config.connection_timeout()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_pool_reuses_single_connection() {
        let pool = SqlitePool::open_in_memory().unwrap();
        {
            let conn = pool.acquire().unwrap();
            conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
        }
        let conn = pool.acquire().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 't'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(pool.created_connections(), 1);
        assert_eq!(pool.max_concurrency(), 1);
    }

    #[test]
    fn test_connection_released_on_drop() {
        let pool = SqlitePool::open_in_memory().unwrap();
        assert_eq!(pool.idle_connections(), 1);
        let conn = pool.acquire().unwrap();
        assert_eq!(pool.idle_connections(), 0);
        drop(conn);
        assert_eq!(pool.idle_connections(), 1);
    }

    #[test]
    fn test_exhausted_pool_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pool.sqlite");
        Connection::open(&path).unwrap();

        let config = PoolConfig {
            max_connections: 1,
            connection_timeout_ms: 20,
            ..PoolConfig::default()
        };
        let pool = SqlitePool::open(&path, config).unwrap();
        let _held = pool.acquire().unwrap();
        let result = pool.acquire();
        assert!(matches!(result, Err(Error::ConnectionTimeout(_))));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = SqlitePool::open(dir.path().join("missing.sqlite"), PoolConfig::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_file_pool_shares_data_across_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.sqlite");
        Connection::open(&path).unwrap();
        let pool = SqlitePool::open(&path, PoolConfig::default()).unwrap();

        let a = pool.acquire().unwrap();
        a.execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);").unwrap();
        let b = pool.acquire().unwrap();
        let v: i64 = b.query_row("SELECT v FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(v, 1);
        assert_eq!(pool.created_connections(), 2);
    }
}
