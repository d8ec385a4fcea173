//! In-memory revocation table.

use crate::domain::{RevocationRecord, StoreError};
use crate::ports::RevocationStore;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Revocation table held in a `HashMap` keyed by serial number.
#[derive(Default)]
pub struct InMemoryRevocationStore {
    records: RwLock<HashMap<String, RevocationRecord>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RevocationStore for InMemoryRevocationStore {
    fn lookup(&self, serial: &str) -> Result<Option<RevocationRecord>, StoreError> {
        Ok(self.records.read().get(serial).cloned())
    }

    fn insert(&self, record: RevocationRecord) -> Result<u64, StoreError> {
        let mut records = self.records.write();
        if records.contains_key(&record.serial_number) {
            return Err(StoreError::Duplicate(record.serial_number));
        }
        let id = record.id;
        records.insert(record.serial_number.clone(), record);
        Ok(id)
    }

    fn latest_serial(&self, partition: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.partition == partition)
            .max_by_key(|r| r.id)
            .map(|r| r.serial_number.clone()))
    }
}
