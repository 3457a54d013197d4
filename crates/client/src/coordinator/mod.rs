//! The cache coordinator.
//!
//! An explicit state object with three hooks, driven by whatever adapter
//! hosts it:
//!
//! - [`Coordinator::on_install`] creates the current generation and fills it
//!   with the precache set, all or nothing.
//! - [`Coordinator::on_activate`] deletes every other generation and claims
//!   control of requests.
//! - [`Coordinator::on_request`] routes one intercepted request: bypass,
//!   network-first for navigations, cache-first for static assets.
//!
//! Cache writes on the request path are spawned and never awaited by the
//! caller; their failures are logged and dropped.

mod intercept;
mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use scribe_offline_core::{AppConfig, CacheStore, Error, RequestKey, StoredResponse};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use url::Url;

use crate::fetch::{Network, identity, parse_origin, resolve};
use crate::request::AssetResponse;

pub use intercept::{Served, Source};
pub use lifecycle::{ActivateReport, InstallReport};

/// Lifecycle state of a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Parsed,
    Installing,
    Installed,
    Activating,
    /// Controls requests.
    Activated,
    /// Install failed; register again to retry.
    Redundant,
}

/// What a coordinator instance serves and caches.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bare origin (scheme, host, port).
    pub origin: Url,
    /// Current generation identifier.
    pub generation: String,
    /// Origin-relative precache paths.
    pub precache: Vec<String>,
    /// Path prefix that is never intercepted.
    pub bypass_prefix: String,
}

impl CoordinatorConfig {
    pub fn new(origin: Url, generation: impl Into<String>) -> Self {
        let defaults = AppConfig::default();
        Self { origin, generation: generation.into(), precache: defaults.precache, bypass_prefix: defaults.bypass_prefix }
    }

    /// The origin root document, served as the last-resort navigation fallback.
    pub fn root_url(&self) -> Url {
        let mut root = self.origin.clone();
        root.set_path("/");
        root
    }
}

impl TryFrom<&AppConfig> for CoordinatorConfig {
    type Error = Error;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        let origin = parse_origin(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            origin,
            generation: config.generation.clone(),
            precache: config.precache.clone(),
            bypass_prefix: config.bypass_prefix.clone(),
        })
    }
}

/// Snapshot of coordinator and store state.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub generation: String,
    pub state: Lifecycle,
    /// Every generation present in the store.
    pub generations: Vec<String>,
    /// Entries in the current generation.
    pub entries: u64,
}

/// Generational cache coordinator over a store and a network.
pub struct Coordinator {
    config: CoordinatorConfig,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Network>,
    state: RwLock<Lifecycle>,
    writes: Mutex<JoinSet<()>>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, store: Arc<dyn CacheStore>, network: Arc<dyn Network>) -> Self {
        Self { config, store, network, state: RwLock::new(Lifecycle::Parsed), writes: Mutex::new(JoinSet::new()) }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    pub async fn state(&self) -> Lifecycle {
        *self.state.read().await
    }

    /// Current generation, lifecycle state and stored generations.
    pub async fn status(&self) -> Result<StatusReport, Error> {
        let generations = self.store.generations().await?;
        let entries = self.store.count(&self.config.generation).await?;
        Ok(StatusReport { generation: self.config.generation.clone(), state: self.state().await, generations, entries })
    }

    /// Entry stored in the current generation for a GET of `url`.
    pub async fn cached(&self, url: &str) -> Result<Option<StoredResponse>, Error> {
        let url = resolve(&self.config.origin, url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let key = RequestKey::get(identity(&url));
        self.store.lookup(&self.config.generation, &key).await
    }

    /// Wait for every scheduled cache write to finish.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.writes.lock().await);
        while let Some(done) = pending.join_next().await {
            if let Err(e) = done {
                tracing::warn!(error = %e, "cache write task did not complete");
            }
        }
    }

    /// Read from the current generation. Store failures and undecodable
    /// entries read as a miss.
    async fn lookup(&self, key: &RequestKey) -> Option<AssetResponse> {
        let stored = match self.store.lookup(&self.config.generation, key).await {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "cache lookup failed; treating as miss");
                return None;
            }
        };

        match AssetResponse::try_from(stored) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(url = %key.url, error = %e, "stored entry unreadable; treating as miss");
                None
            }
        }
    }

    /// Store a copy of `response` in the current generation without blocking the caller.
    async fn schedule_write(&self, key: RequestKey, response: &AssetResponse) {
        let store = Arc::clone(&self.store);
        let generation = self.config.generation.clone();
        let stored = response.to_stored();

        let mut writes = self.writes.lock().await;
        while let Some(done) = writes.try_join_next() {
            if let Err(e) = done {
                tracing::warn!(error = %e, "cache write task did not complete");
            }
        }
        writes.spawn(async move {
            match store.put(&generation, &key, &stored).await {
                Ok(()) => tracing::debug!(url = %key.url, generation = %generation, "cached response"),
                Err(e) => tracing::warn!(url = %key.url, generation = %generation, error = %e, "cache write failed"),
            }
        });
    }
}
