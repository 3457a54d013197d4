//! asset_fetch tool implementation.
//!
//! Issues a request the way a controlled page would and reports where the
//! response came from.

use reqwest::Method;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use scribe_offline_client::{AssetRequest, Coordinator, fetch::resolve};
use scribe_offline_core::Error;

use crate::error::ToolError;

/// Input parameters for asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: "GET"). Anything else bypasses the cache.
    #[serde(default = "default_method")]
    pub method: String,

    /// Treat the request as a top-level document load.
    #[serde(default)]
    pub navigate: bool,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchOutput {
    /// The URL requested, after resolution.
    pub url: String,
    /// The URL the response was served from.
    pub final_url: String,
    pub status: u16,
    /// One of "passthrough", "network", "cache" or "root_fallback".
    pub source: String,
    pub content_type: Option<String>,
    pub redirected: bool,
    pub body_len: usize,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

/// Implementation of the asset_fetch tool.
pub async fn fetch_impl(coordinator: &Coordinator, params: AssetFetchParams) -> Result<CallToolResult, McpError> {
    let url = resolve(&coordinator.config().origin, &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = Method::from_bytes(params.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::InvalidInput(format!("unsupported method: {}", params.method)))?;

    let request = if params.navigate { AssetRequest::navigate(url) } else { AssetRequest::get(url) };
    let request = request.with_method(method);
    let requested = request.url.to_string();

    let served = coordinator.on_request(request).await.map_err(ToolError::from)?;
    let response = served.response;

    let output = AssetFetchOutput {
        url: requested,
        final_url: response.url.to_string(),
        status: response.status.as_u16(),
        source: served.source.as_str().to_string(),
        content_type: response.content_type().map(str::to_string),
        redirected: response.redirected,
        body_len: response.body.len(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize response: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
