//! Redb embedded cache implementation
//!
//! Persistent key-value store for upstream responses, so repeated runs
//! within the TTL do not hit the network.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use application::{
    error::ApplicationError,
    ports::{CachePort, CacheStats},
};
use async_trait::async_trait;
use bincode::{Decode, Encode};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::{debug, instrument, warn};

/// Table definition for cache entries
const CACHE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("cache");

/// Entry wrapper that includes expiration time
#[derive(Debug, Encode, Decode)]
struct CacheEntry {
    /// Cached bytes
    data: Vec<u8>,
    /// Expiration timestamp (Unix epoch seconds)
    expires_at: u64,
}

/// Redb-based persistent cache
///
/// # Auto-Recovery
///
/// If the database file is corrupted or incompatible, it is deleted and
/// recreated.
pub struct RedbCache {
    db: Arc<Database>,
    path: Option<PathBuf>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for RedbCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbCache")
            .field("path", &self.path)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

fn internal(context: &str) -> impl FnOnce(redb::Error) -> ApplicationError + '_ {
    move |e| ApplicationError::Internal(format!("{context}: {e}"))
}

impl RedbCache {
    /// Open or create a cache file at the given path
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened after recreation.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ApplicationError> {
        let path_buf = path.as_ref().to_path_buf();
        if let Some(parent) = path_buf.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ApplicationError::Internal(format!("Failed to create cache directory: {e}"))
            })?;
        }

        let db = match Database::create(&path_buf) {
            Ok(db) => db,
            Err(e) => {
                warn!(
                    path = %path_buf.display(),
                    error = %e,
                    "Cache database corrupted or incompatible, recreating"
                );
                if path_buf.exists() {
                    fs::remove_file(&path_buf).map_err(|e| {
                        ApplicationError::Internal(format!(
                            "Failed to remove corrupted database: {e}"
                        ))
                    })?;
                }
                Database::create(&path_buf).map_err(|e| {
                    ApplicationError::Internal(format!("Failed to create Redb database: {e}"))
                })?
            },
        };

        Self::from_database(db, Some(path_buf))
    }

    /// Create an in-memory cache (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, ApplicationError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| {
                ApplicationError::Internal(format!("Failed to create in-memory Redb: {e}"))
            })?;
        Self::from_database(db, None)
    }

    fn from_database(db: Database, path: Option<PathBuf>) -> Result<Self, ApplicationError> {
        let init = || -> Result<(), redb::Error> {
            let write_txn = db.begin_write()?;
            {
                // Opening the table creates it if it doesn't exist
                let _ = write_txn.open_table(CACHE_TABLE)?;
            }
            write_txn.commit()?;
            Ok(())
        };
        init().map_err(internal("Failed to initialize cache table"))?;

        Ok(Self {
            db: Arc::new(db),
            path,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Location of the cache file, `None` when in memory
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn now_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::now_timestamp() >= entry.expires_at
    }

    fn entry_count(&self) -> u64 {
        self.db
            .begin_read()
            .ok()
            .and_then(|txn| txn.open_table(CACHE_TABLE).ok())
            .and_then(|table| table.len().ok())
            .unwrap_or(0)
    }

    /// Remove every expired entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or written.
    pub async fn cleanup_expired(&self) -> Result<u64, ApplicationError> {
        let db = Arc::clone(&self.db);
        let now = Self::now_timestamp();

        let removed = tokio::task::spawn_blocking(move || {
            let expired: Vec<Vec<u8>> = {
                let read_txn = db.begin_read()?;
                let table = read_txn.open_table(CACHE_TABLE)?;
                table
                    .iter()?
                    .filter_map(|result| {
                        result.ok().and_then(|(key, value)| {
                            bincode::decode_from_slice::<CacheEntry, _>(
                                value.value(),
                                bincode::config::standard(),
                            )
                            .ok()
                            .filter(|(entry, _)| now >= entry.expires_at)
                            .map(|_| key.value().to_vec())
                        })
                    })
                    .collect()
            };

            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CACHE_TABLE)?;
                for key in &expired {
                    table.remove(key.as_slice())?;
                }
            }
            write_txn.commit()?;
            Ok::<_, redb::Error>(expired.len() as u64)
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("Task join error: {e}")))?
        .map_err(internal("Redb cleanup error"))?;

        if removed > 0 {
            debug!(removed = removed, "Cleaned up expired cache entries");
        }
        Ok(removed)
    }
}

#[async_trait]
impl CachePort for RedbCache {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, ApplicationError> {
        let db = Arc::clone(&self.db);
        let key_bytes = key.as_bytes().to_vec();

        // Redb operations are blocking
        let stored = tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(CACHE_TABLE)?;
            Ok::<_, redb::Error>(table.get(key_bytes.as_slice())?.map(|v| v.value().to_vec()))
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("Task join error: {e}")))?
        .map_err(internal("Redb get error"))?;

        let Some(bytes) = stored else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        let decoded =
            bincode::decode_from_slice::<CacheEntry, _>(&bytes, bincode::config::standard());
        let entry = match decoded {
            Ok((entry, _)) if !Self::is_expired(&entry) => entry,
            Ok(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache entry expired");
                self.invalidate(key).await?;
                return Ok(None);
            },
            Err(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Unreadable cache entry dropped");
                self.invalidate(key).await?;
                return Ok(None);
            },
        };

        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache hit");
        Ok(Some(entry.data))
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), ApplicationError> {
        let entry = CacheEntry {
            data: value,
            expires_at: Self::now_timestamp() + ttl.as_secs(),
        };
        let entry_bytes = bincode::encode_to_vec(&entry, bincode::config::standard())
            .map_err(|e| ApplicationError::Internal(format!("Entry serialize error: {e}")))?;

        let db = Arc::clone(&self.db);
        let key_bytes = key.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CACHE_TABLE)?;
                table.insert(key_bytes.as_slice(), entry_bytes.as_slice())?;
            }
            write_txn.commit()?;
            Ok::<_, redb::Error>(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("Task join error: {e}")))?
        .map_err(internal("Redb insert error"))?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn invalidate(&self, key: &str) -> Result<(), ApplicationError> {
        let db = Arc::clone(&self.db);
        let key_bytes = key.as_bytes().to_vec();

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(CACHE_TABLE)?;
                table.remove(key_bytes.as_slice())?;
            }
            write_txn.commit()?;
            Ok::<_, redb::Error>(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("Task join error: {e}")))?
        .map_err(internal("Redb remove error"))?;

        debug!(key = %key, "Cache invalidated");
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entry_count(),
        }
    }
}
