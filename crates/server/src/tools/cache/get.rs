//! cache_get tool implementation.
//!
//! Retrieves the entry stored in the current generation for a GET of a URL.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use scribe_offline_client::Coordinator;
use scribe_offline_core::Error;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,
}

/// Output from the cache_get tool. The body itself is not returned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub generation: String,
    /// URL the stored response was served from.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_len: usize,
    pub stored_at: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(coordinator: &Coordinator, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let entry = coordinator
        .cached(&params.url)
        .await?
        .ok_or_else(|| Error::CacheMiss(params.url.clone()))?;

    let output = CacheGetOutput {
        generation: coordinator.generation().to_string(),
        content_type: entry.header("content-type").map(str::to_string),
        body_len: entry.body.len(),
        url: entry.url,
        status: entry.status,
        status_text: entry.status_text,
        headers: entry.headers,
        stored_at: entry.stored_at,
    };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize entry: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
