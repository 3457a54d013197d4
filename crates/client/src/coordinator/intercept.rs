//! Request interception.

use scribe_offline_core::RequestKey;
use serde::Serialize;

use super::{Coordinator, Lifecycle};
use crate::fetch::{FetchError, identity};
use crate::request::{AssetRequest, AssetResponse};
use crate::route::{Route, classify};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Not intercepted; straight from the network.
    Passthrough,
    Network,
    Cache,
    /// Cached origin root served for a failed navigation.
    RootFallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Passthrough => "passthrough",
            Source::Network => "network",
            Source::Cache => "cache",
            Source::RootFallback => "root_fallback",
        }
    }
}

/// A response together with its source.
#[derive(Debug, Clone)]
pub struct Served {
    pub source: Source,
    pub response: AssetResponse,
}

impl Served {
    fn new(source: Source, response: AssetResponse) -> Self {
        Self { source, response }
    }
}

impl Coordinator {
    /// Serve one intercepted request.
    ///
    /// The only error is a network failure with nothing cached to fall back
    /// on, returned exactly as the network produced it. Store failures never
    /// surface here.
    pub async fn on_request(&self, request: AssetRequest) -> Result<Served, FetchError> {
        if self.state().await != Lifecycle::Activated {
            tracing::debug!(url = %request.url, "not controlling yet; passing through");
            return self.passthrough(&request).await;
        }

        match classify(&request, &self.config.origin, &self.config.bypass_prefix) {
            Route::Bypass(reason) => {
                tracing::debug!(url = %request.url, method = %request.method, ?reason, "bypassing cache");
                self.passthrough(&request).await
            }
            Route::Navigation => self.network_first(&request).await,
            Route::Asset => self.cache_first(&request).await,
        }
    }

    async fn passthrough(&self, request: &AssetRequest) -> Result<Served, FetchError> {
        let response = self.network.fetch(request).await?;
        Ok(Served::new(Source::Passthrough, response))
    }

    async fn network_first(&self, request: &AssetRequest) -> Result<Served, FetchError> {
        let key = request.key();

        let err = match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.schedule_write(key, &response).await;
                }
                return Ok(Served::new(Source::Network, response));
            }
            Err(err) => err,
        };

        tracing::debug!(url = %request.url, error = %err, "navigation fetch failed; trying cache");

        if let Some(cached) = self.lookup(&key).await {
            return Ok(Served::new(Source::Cache, cached));
        }

        let root = RequestKey::get(identity(&self.config.root_url()));
        if let Some(cached) = self.lookup(&root).await {
            tracing::debug!(url = %request.url, "serving cached root document");
            return Ok(Served::new(Source::RootFallback, cached));
        }

        Err(err)
    }

    async fn cache_first(&self, request: &AssetRequest) -> Result<Served, FetchError> {
        let key = request.key();

        if let Some(cached) = self.lookup(&key).await {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(Served::new(Source::Cache, cached));
        }

        let response = self.network.fetch(request).await?;
        if response.is_cacheable() {
            self.schedule_write(key, &response).await;
        } else {
            tracing::debug!(url = %request.url, status = response.status.as_u16(), "response not cacheable");
        }
        Ok(Served::new(Source::Network, response))
    }
}
