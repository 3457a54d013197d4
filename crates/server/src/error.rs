//! Errors raised by the tool layer itself.
//!
//! Store and lifecycle errors already convert from `scribe_offline_core::Error`;
//! this covers request parsing and network failures surfaced by `asset_fetch`.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use scribe_offline_client::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Unparseable tool arguments (e.g., an unknown HTTP method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The network failed and nothing cached could stand in.
    #[error("NETWORK_ERROR: {0}")]
    Fetch(#[from] FetchError),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::Fetch(FetchError::Timeout(msg)) => (-32006, msg.clone()),
            ToolError::Fetch(FetchError::TooLarge { .. }) => (-32007, err.to_string()),
            ToolError::Fetch(e) => (-32008, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
