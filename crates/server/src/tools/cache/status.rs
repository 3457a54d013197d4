//! cache_status tool implementation.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use scribe_offline_client::Coordinator;
use scribe_offline_core::Error;

/// Parameters for the cache_status tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusParams {}

/// Implementation of the cache_status tool.
pub async fn status_impl(coordinator: &Coordinator, _params: CacheStatusParams) -> Result<CallToolResult, McpError> {
    let status = coordinator.status().await?;
    let json = serde_json::to_string_pretty(&status)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize status: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
