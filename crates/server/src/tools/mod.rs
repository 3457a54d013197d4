//! MCP tool implementations.
//!
//! This module contains all tools exposed by the scribe-offline server.

pub mod asset_fetch;
pub mod cache;
