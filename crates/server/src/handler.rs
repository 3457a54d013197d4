//! MCP server handler implementation.
//!
//! Routes tool calls to a shared [`Coordinator`].
use std::sync::Arc;

use crate::tools::asset_fetch::{AssetFetchParams, fetch_impl};
use crate::tools::cache::{
    CacheGetParams, CacheRegisterParams, CacheStatusParams, get_impl, register_impl, status_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use scribe_offline_client::Coordinator;

/// The MCP server handler for scribe-offline.
#[derive(Clone)]
pub struct ScribeOfflineServer {
    coordinator: Arc<Coordinator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScribeOfflineServer {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self { coordinator, tool_router: Self::tool_router() }
    }

    /// Request a URL as a controlled page would.
    #[tool(
        description = "Request a URL through the offline cache. Navigations are network-first with cached fallback; static assets are cache-first. Returns status, source and body."
    )]
    async fn asset_fetch(&self, params: Parameters<AssetFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.coordinator, params.0).await
    }

    #[tool(description = "Report the current cache generation, lifecycle state, stored generations and entry count.")]
    async fn cache_status(&self, params: Parameters<CacheStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.coordinator, params.0).await
    }

    #[tool(description = "Look up the cached entry for a GET of a URL in the current generation. Returns metadata, not the body.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.coordinator, params.0).await
    }

    /// Install and activate the current generation.
    #[tool(description = "Install the precache set and activate the current generation, deleting stale ones. Retries a failed install.")]
    async fn cache_register(&self, params: Parameters<CacheRegisterParams>) -> Result<CallToolResult, McpError> {
        register_impl(&self.coordinator, params.0).await
    }
}

impl ServerHandler for ScribeOfflineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "scribe-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
