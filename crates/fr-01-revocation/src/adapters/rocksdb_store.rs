//! # RocksDB Revocation Store
//!
//! Persistent revocation table.
//!
//! ## Key Layout
//!
//! - `rev/{serial}` - JSON-encoded [`RevocationRecord`]
//! - `latest/{partition}` - JSON `{id, serial}` of the highest-id record

use crate::domain::{RevocationRecord, StoreError};
use crate::ports::RevocationStore;
use parking_lot::Mutex;
use rocksdb::{Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};

const RECORD_PREFIX: &str = "rev/";
const LATEST_PREFIX: &str = "latest/";

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbStoreConfig {
    /// Path to the database directory
    pub path: String,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbStoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/revocations".to_string(),
            sync_writes: true,
        }
    }
}

impl RocksDbStoreConfig {
    /// Create config for testing (no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LatestPointer {
    id: u64,
    serial: String,
}

/// RocksDB-backed [`RevocationStore`].
pub struct RocksDbRevocationStore {
    db: DB,
    config: RocksDbStoreConfig,
    /// Serializes check-then-write in `insert`.
    write_lock: Mutex<()>,
}

impl RocksDbRevocationStore {
    /// Open or create the database.
    pub fn open(config: RocksDbStoreConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StoreError::Backend(format!("Failed to open RocksDB: {}", e)))?;

        tracing::info!("[fr-01] Opened revocation store at {}", config.path);
        Ok(Self {
            db,
            config,
            write_lock: Mutex::new(()),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.db.get(key.as_bytes()) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Codec(format!("{}: {}", key, e))),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}

impl RevocationStore for RocksDbRevocationStore {
    fn lookup(&self, serial: &str) -> Result<Option<RevocationRecord>, StoreError> {
        self.get_json(&format!("{}{}", RECORD_PREFIX, serial))
    }

    fn insert(&self, record: RevocationRecord) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock();

        let record_key = format!("{}{}", RECORD_PREFIX, record.serial_number);
        if self.get_json::<RevocationRecord>(&record_key)?.is_some() {
            return Err(StoreError::Duplicate(record.serial_number));
        }

        let encoded = serde_json::to_vec(&record).map_err(|e| StoreError::Codec(e.to_string()))?;
        let mut batch = WriteBatch::default();
        batch.put(record_key.as_bytes(), encoded);

        let latest_key = format!("{}{}", LATEST_PREFIX, record.partition);
        let newer = self
            .get_json::<LatestPointer>(&latest_key)?
            .map_or(true, |p| record.id > p.id);
        if newer {
            let pointer = LatestPointer {
                id: record.id,
                serial: record.serial_number.clone(),
            };
            let encoded = serde_json::to_vec(&pointer).map_err(|e| StoreError::Codec(e.to_string()))?;
            batch.put(latest_key.as_bytes(), encoded);
        }

        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(record.id)
    }

    fn latest_serial(&self, partition: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .get_json::<LatestPointer>(&format!("{}{}", LATEST_PREFIX, partition))?
            .map(|p| p.serial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, RocksDbRevocationStore) {
        let dir = TempDir::new().unwrap();
        let config = RocksDbStoreConfig::for_testing(dir.path().to_string_lossy().to_string());
        let store = RocksDbRevocationStore::open(config).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_lookup_and_duplicate() {
        let (_dir, store) = open_temp();
        store.insert(RevocationRecord::new(1, "1234", "net1", 100)).unwrap();

        assert_eq!(store.lookup("1234").unwrap().unwrap().id, 1);
        assert!(store.lookup("9999").unwrap().is_none());
        assert!(matches!(
            store.insert(RevocationRecord::new(2, "1234", "net1", 0)),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn test_latest_pointer_only_moves_forward() {
        let (_dir, store) = open_temp();
        store.insert(RevocationRecord::new(5, "55", "net1", 0)).unwrap();
        store.insert(RevocationRecord::new(2, "22", "net1", 0)).unwrap();
        assert_eq!(store.latest_serial("net1").unwrap(), Some("55".into()));
        assert_eq!(store.latest_serial("net2").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_string_lossy().to_string();
        {
            let store = RocksDbRevocationStore::open(RocksDbStoreConfig::for_testing(path.clone())).unwrap();
            store.insert(RevocationRecord::new(1, "1234", "net1", 100)).unwrap();
        }
        let store = RocksDbRevocationStore::open(RocksDbStoreConfig::for_testing(path)).unwrap();
        assert!(store.lookup("1234").unwrap().is_some());
    }
}
