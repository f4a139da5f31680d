//! In-memory record store for testing and development.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, SamplerError};
use crate::traits::store::RecordStore;
use crate::types::record::{Record, RecordId};
use crate::types::taxonomy::CategoryKey;

/// Records kept in insertion order. Data is lost on drop.
pub struct MemoryStore {
    records: RwLock<IndexMap<RecordId, Record>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// Store pre-populated with records (e.g. a previous run's output).
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<RecordId, Record>>> {
        self.records
            .read()
            .map_err(|_| SamplerError::storage("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<RecordId, Record>>> {
        self.records
            .write()
            .map_err(|_| SamplerError::storage("memory store lock poisoned"))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn exists(&self, id: &RecordId) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    async fn insert(&self, record: &Record) -> Result<bool> {
        let mut records = self.write()?;
        if records.contains_key(&record.id) {
            return Ok(false);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(true)
    }

    async fn load_progress(&self) -> Result<HashMap<CategoryKey, usize>> {
        let mut progress = HashMap::new();
        for record in self.read()?.values() {
            *progress.entry(record.category).or_insert(0) += 1;
        }
        Ok(progress)
    }

    async fn clear(&self) -> Result<usize> {
        let mut records = self.write()?;
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn replace(&self, record: &Record) -> Result<bool> {
        let mut records = self.write()?;
        match records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
