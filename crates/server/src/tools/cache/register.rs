//! cache_register tool implementation.
//!
//! Runs install and activate; a coordinator left redundant by a failed boot
//! install retries here.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use scribe_offline_client::Coordinator;
use scribe_offline_core::Error;

/// Parameters for the cache_register tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheRegisterParams {}

/// Implementation of the cache_register tool.
pub async fn register_impl(
    coordinator: &Coordinator, _params: CacheRegisterParams,
) -> Result<CallToolResult, McpError> {
    let report = coordinator.register().await?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize report: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
