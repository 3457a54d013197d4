//! Install and activate hooks.

use futures_util::future::join_all;
use reqwest::StatusCode;
use scribe_offline_core::{Error, RequestKey, StoredResponse};
use serde::Serialize;
use url::Url;

use super::{Coordinator, Lifecycle};
use crate::fetch::resolve;
use crate::request::AssetRequest;

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub generation: String,
    /// Number of precache entries written.
    pub precached: usize,
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub generation: String,
    /// Stale generations removed from the store.
    pub deleted: Vec<String>,
}

impl Coordinator {
    /// Move from one of `from` to `to`, or fail with the current state.
    async fn transition(&self, from: &[Lifecycle], to: Lifecycle) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !from.contains(&*state) {
            return Err(Error::InvalidState(format!("cannot enter {to:?} from {:?}", *state)));
        }
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: Lifecycle) {
        *self.state.write().await = to;
    }

    /// Create the current generation and fill it with the precache set.
    ///
    /// Every member is fetched before anything is written; one failed fetch
    /// or non-2xx status fails the whole install, leaves nothing behind, and
    /// marks the coordinator redundant.
    pub async fn on_install(&self) -> Result<InstallReport, Error> {
        self.transition(&[Lifecycle::Parsed, Lifecycle::Redundant], Lifecycle::Installing)
            .await?;
        tracing::info!(generation = %self.config.generation, "installing cache generation");

        let created = match self.store.open(&self.config.generation).await {
            Ok(created) => created,
            Err(e) => {
                self.set_state(Lifecycle::Redundant).await;
                return Err(e);
            }
        };

        match self.precache().await {
            Ok(precached) => {
                self.set_state(Lifecycle::Installed).await;
                tracing::info!(generation = %self.config.generation, precached, "cache generation installed");
                Ok(InstallReport { generation: self.config.generation.clone(), precached })
            }
            Err(e) => {
                if created && let Err(cleanup) = self.store.delete(&self.config.generation).await {
                    tracing::warn!(generation = %self.config.generation, error = %cleanup, "could not remove failed generation");
                }
                self.set_state(Lifecycle::Redundant).await;
                tracing::warn!(generation = %self.config.generation, error = %e, "cache install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, Error> {
        let mut urls: Vec<Url> = Vec::with_capacity(self.config.precache.len());
        for path in &self.config.precache {
            let url = resolve(&self.config.origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        let requests: Vec<AssetRequest> = urls.into_iter().map(AssetRequest::get).collect();
        let responses = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut entries: Vec<(RequestKey, StoredResponse)> = Vec::with_capacity(requests.len());
        for (request, response) in requests.iter().zip(responses) {
            let response = response
                .map_err(|e| Error::PrecacheFailed { url: request.url.to_string(), reason: e.to_string() })?;
            if !response.status.is_success() || response.status == StatusCode::PARTIAL_CONTENT {
                return Err(Error::PrecacheFailed {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status.as_u16()),
                });
            }
            entries.push((request.key(), response.to_stored()));
        }

        self.store.put_all(&self.config.generation, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every stale generation, then claim control of requests.
    pub async fn on_activate(&self) -> Result<ActivateReport, Error> {
        self.transition(&[Lifecycle::Installed], Lifecycle::Activating).await?;

        match self.prune().await {
            Ok(deleted) => {
                self.set_state(Lifecycle::Activated).await;
                tracing::info!(generation = %self.config.generation, deleted = deleted.len(), "cache generation activated");
                Ok(ActivateReport { generation: self.config.generation.clone(), deleted })
            }
            Err(e) => {
                self.set_state(Lifecycle::Installed).await;
                tracing::warn!(generation = %self.config.generation, error = %e, "cache activation failed");
                Err(e)
            }
        }
    }

    async fn prune(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();
        for name in self.store.generations().await? {
            if name == self.config.generation {
                continue;
            }
            if self.store.delete(&name).await? {
                tracing::debug!(generation = %name, "deleted stale cache generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Install then activate without waiting for older clients.
    ///
    /// An already active coordinator only reports; a redundant one retries
    /// the install.
    pub async fn register(&self) -> Result<ActivateReport, Error> {
        match self.state().await {
            Lifecycle::Activated => {
                return Ok(ActivateReport { generation: self.config.generation.clone(), deleted: Vec::new() });
            }
            Lifecycle::Installed => {}
            _ => {
                self.on_install().await?;
            }
        }
        self.on_activate().await
    }
}
