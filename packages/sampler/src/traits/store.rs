//! Persistence collaborator for collected records.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::record::{Record, RecordId};
use crate::types::taxonomy::CategoryKey;

/// Durable record storage keyed by [`RecordId`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether a record with this identity is already stored.
    async fn exists(&self, id: &RecordId) -> Result<bool>;

    /// Store a new record.
    ///
    /// Returns `Ok(false)` when a record with the same identity already
    /// exists; nothing is overwritten.
    async fn insert(&self, record: &Record) -> Result<bool>;

    /// Stored record count per category.
    async fn load_progress(&self) -> Result<HashMap<CategoryKey, usize>>;

    /// Remove every record. Returns how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Fetch one record.
    async fn get(&self, id: &RecordId) -> Result<Option<Record>>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<Record>>;

    /// Overwrite an existing record with a newer version.
    ///
    /// Returns `Ok(false)` when no record with that identity exists.
    async fn replace(&self, record: &Record) -> Result<bool>;

    /// Total stored records.
    async fn count(&self) -> Result<usize> {
        Ok(self.load_progress().await?.values().sum())
    }
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn exists(&self, id: &RecordId) -> Result<bool> {
        (**self).exists(id).await
    }

    async fn insert(&self, record: &Record) -> Result<bool> {
        (**self).insert(record).await
    }

    async fn load_progress(&self) -> Result<HashMap<CategoryKey, usize>> {
        (**self).load_progress().await
    }

    async fn clear(&self) -> Result<usize> {
        (**self).clear().await
    }

    async fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<Record>> {
        (**self).list().await
    }

    async fn replace(&self, record: &Record) -> Result<bool> {
        (**self).replace(record).await
    }

    async fn count(&self) -> Result<usize> {
        (**self).count().await
    }
}
