//! Client side of scribe-offline.
//!
//! The cache coordinator, its routing rules and the network it reads
//! through. The server wraps a [`Coordinator`] behind MCP tools.

pub mod coordinator;
pub mod fetch;
pub mod request;
pub mod route;

pub use coordinator::{
    ActivateReport, Coordinator, CoordinatorConfig, InstallReport, Lifecycle, Served, Source, StatusReport,
};
pub use fetch::{FetchConfig, FetchError, HttpNetwork, Network};
pub use request::{AssetRequest, AssetResponse, RequestMode, ResponseKind};
pub use route::{BypassReason, Route, classify};
