//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use deployiq_core::traits::StoreResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and, for file-backed databases, the
/// read connection pool.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    /// `None` in memory: a private in-memory database is invisible to other
    /// connections, so every read goes through the writer.
    pub readers: Option<Arc<ReadPool>>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize) -> StoreResult<Self> {
        let writer = Arc::new(WriteConnection::open(path)?);
        let readers = Arc::new(ReadPool::open(path, read_pool_size)?);
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open a writer-only in-memory pool (for tests and ephemeral runs).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            writer: Arc::new(WriteConnection::open_in_memory()?),
            readers: None,
            db_path: None,
        })
    }
}
