//! Read-only connections handed out round-robin. Under WAL they never wait
//! on the writer, only on each other.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use deployiq_core::errors::StorageError;
use deployiq_core::traits::StoreResult;

use super::pragmas::apply_read_pragmas;
use crate::to_storage_err;

/// Upper bound on `storage.read_pool_size`.
const MAX_READERS: usize = 8;

pub struct ReadPool {
    readers: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// The database file must already exist; the writer creates it.
    pub fn open(path: &Path, requested: usize) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let readers = (0..requested.clamp(1, MAX_READERS))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(e.to_string()))?;
                apply_read_pragmas(&conn)?;
                Ok(Mutex::new(conn))
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self {
            readers,
            cursor: AtomicUsize::new(0),
        })
    }

    fn next_slot(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % self.readers.len()
    }

    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let slot = self.next_slot();
        let conn = self.readers[slot]
            .lock()
            .map_err(|e| StorageError::LockPoisoned {
                details: format!("reader {slot}: {e}"),
            })?;
        f(&conn)
    }

    pub fn size(&self) -> usize {
        self.readers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_db(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("deployiq.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (7);")
            .unwrap();
        path
    }

    #[test]
    fn size_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = seeded_db(&dir);
        assert_eq!(ReadPool::open(&path, 0).unwrap().size(), 1);
        assert_eq!(ReadPool::open(&path, 64).unwrap().size(), MAX_READERS);
    }

    #[test]
    fn slots_rotate() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ReadPool::open(&seeded_db(&dir), 3).unwrap();
        let slots: Vec<_> = (0..4).map(|_| pool.next_slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 0]);

        let v: i64 = pool
            .with_conn(|c| {
                c.query_row("SELECT v FROM t", [], |r| r.get(0))
                    .map_err(|e| to_storage_err(e.to_string()))
            })
            .unwrap();
        assert_eq!(v, 7);
    }
}
