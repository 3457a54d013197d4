//! Core types and shared functionality for scribe-offline.
//!
//! This crate provides:
//! - Generational cache store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheStore, RequestKey, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
