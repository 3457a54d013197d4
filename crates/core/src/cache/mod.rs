//! SQLite-backed generational cache for captured responses.
//!
//! This module provides a persistent cache using SQLite with async access via
//! tokio-rusqlite. Entries live inside named generations:
//!
//! - Exactly one generation is current; stale ones are deleted wholesale
//! - Entries are keyed by a SHA-256 digest of method and canonical URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod entry;
pub mod generations;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entry::{RequestKey, StoredResponse};
pub use store::CacheStore;
