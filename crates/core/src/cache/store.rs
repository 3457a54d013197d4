//! Store abstraction used by the coordinator.
//!
//! Mirrors the platform cache-storage primitive: named generations, each a
//! map from request identity to captured response. Every operation is
//! individually atomic; there are no multi-operation transactions beyond
//! `put_all`.

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entry::{RequestKey, StoredResponse};
use crate::Error;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open a generation, creating it if absent. Returns true when created.
    async fn open(&self, generation: &str) -> Result<bool, Error>;

    /// Names of every stored generation.
    async fn generations(&self) -> Result<Vec<String>, Error>;

    /// Delete a generation and its entries. Returns false if it did not exist.
    async fn delete(&self, generation: &str) -> Result<bool, Error>;

    /// Store one entry. Opens the generation if needed.
    async fn put(&self, generation: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error>;

    /// Store a batch atomically.
    async fn put_all(&self, generation: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error>;

    /// Exact-match lookup within one generation.
    async fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Number of entries in a generation.
    async fn count(&self, generation: &str) -> Result<u64, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, generation: &str) -> Result<bool, Error> {
        self.open_generation(generation).await
    }

    async fn generations(&self) -> Result<Vec<String>, Error> {
        self.list_generations().await
    }

    async fn delete(&self, generation: &str) -> Result<bool, Error> {
        self.delete_generation(generation).await
    }

    async fn put(&self, generation: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        self.put_entry(generation, key, response).await
    }

    async fn put_all(&self, generation: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        self.put_entries(generation, entries).await
    }

    async fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.match_entry(generation, key).await
    }

    async fn count(&self, generation: &str) -> Result<u64, Error> {
        self.count_entries(generation).await
    }
}
