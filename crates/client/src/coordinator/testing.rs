//! Test doubles for the coordinator: a scripted network and a store that
//! can be made to fail.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use scribe_offline_core::{CacheDb, CacheStore, Error, RequestKey, StoredResponse};
use url::Url;

use super::{Coordinator, CoordinatorConfig};
use crate::fetch::{FetchError, Network};
use crate::request::{AssetRequest, AssetResponse, ResponseKind};

pub(crate) const ORIGIN: &str = "http://localhost:3000";

pub(crate) fn coordinator_with(
    generation: &str, store: Arc<dyn CacheStore>, network: Arc<dyn Network>,
) -> Coordinator {
    let config = CoordinatorConfig::new(Url::parse(ORIGIN).unwrap(), generation);
    Coordinator::new(config, store, network)
}

pub(crate) fn stored(url: &str, body: &[u8]) -> StoredResponse {
    StoredResponse {
        url: url.to_string(),
        status: 200,
        status_text: "OK".to_string(),
        headers: vec![("content-type".to_string(), "text/plain".to_string())],
        body: body.to_vec(),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[derive(Clone)]
enum Reply {
    Respond { status: u16, body: Vec<u8> },
    Redirect { to: String, body: Vec<u8> },
    Fail,
}

/// Network double answering from a per-URL script and recording every call.
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Reply>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self { routes: Mutex::new(HashMap::new()), offline: AtomicBool::new(false), calls: Mutex::new(Vec::new()) }
    }

    /// A small site: the precache set, one page, one script and one backend route.
    pub(crate) fn site() -> Self {
        let network = Self::new();
        network.respond(&format!("{ORIGIN}/"), 200, b"<html>home</html>");
        network.respond(&format!("{ORIGIN}/manifest.webmanifest"), 200, br#"{"name":"Athena Scribe"}"#);
        network.respond(&format!("{ORIGIN}/icon.svg"), 200, b"<svg/>");
        network.respond(&format!("{ORIGIN}/notes"), 200, b"<html>notes</html>");
        network.respond(&format!("{ORIGIN}/app.js"), 200, b"console.log('app')");
        network.respond(&format!("{ORIGIN}/api/inbox"), 200, br#"{"ok":true}"#);
        network
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Respond { status, body: body.to_vec() });
    }

    pub(crate) fn redirect(&self, url: &str, to: &str, body: &[u8]) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Redirect { to: to.to_string(), body: body.to_vec() });
    }

    pub(crate) fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Reply::Fail);
    }

    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Every fetch so far as `"METHOD URL"`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn body_of(&self, url: &str) -> Option<Vec<u8>> {
        match self.routes.lock().unwrap().get(url) {
            Some(Reply::Respond { body, .. } | Reply::Redirect { body, .. }) => Some(body.clone()),
            _ => None,
        }
    }
}

fn content_type_for(url: &Url) -> &'static str {
    match url.path().rsplit('.').next() {
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("webmanifest") => "application/manifest+json",
        Some("css") => "text/css",
        _ => "text/html",
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method, request.url));

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection refused".into()));
        }

        // Fragments never reach the server, and the final URL drops them.
        let mut target = request.url.clone();
        target.set_fragment(None);

        let reply = self.routes.lock().unwrap().get(target.as_str()).cloned();
        let (status, body, url, redirected) = match reply {
            Some(Reply::Fail) => return Err(FetchError::Network("connection reset".into())),
            Some(Reply::Respond { status, body }) => (status, body, target, false),
            Some(Reply::Redirect { to, body }) => (200, body, Url::parse(&to).unwrap(), true),
            None => (404, b"not found".to_vec(), target, false),
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(&url)));

        Ok(AssetResponse {
            url,
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::from(body),
            kind: ResponseKind::Basic,
            redirected,
        })
    }
}

/// Store wrapper whose reads or writes can be switched to fail.
///
/// Failing operations are routed to a closed database, so callers see the
/// same error a store closed underneath them would produce.
pub(crate) struct FailingStore {
    inner: CacheDb,
    closed: CacheDb,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub(crate) async fn new(inner: CacheDb) -> Self {
        let closed = CacheDb::open_in_memory().await.unwrap();
        closed.close().await.unwrap();
        Self { inner, closed, fail_reads: AtomicBool::new(false), fail_writes: AtomicBool::new(false) }
    }

    pub(crate) fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn heal(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        self.fail_writes.store(false, Ordering::SeqCst);
    }

    pub(crate) fn inner(&self) -> &CacheDb {
        &self.inner
    }

    fn pick(&self, flag: &AtomicBool) -> &CacheDb {
        if flag.load(Ordering::SeqCst) { &self.closed } else { &self.inner }
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn open(&self, generation: &str) -> Result<bool, Error> {
        self.pick(&self.fail_writes).open(generation).await
    }

    async fn generations(&self) -> Result<Vec<String>, Error> {
        self.pick(&self.fail_reads).generations().await
    }

    async fn delete(&self, generation: &str) -> Result<bool, Error> {
        self.pick(&self.fail_writes).delete(generation).await
    }

    async fn put(&self, generation: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        self.pick(&self.fail_writes).put(generation, key, response).await
    }

    async fn put_all(&self, generation: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        self.pick(&self.fail_writes).put_all(generation, entries).await
    }

    async fn lookup(&self, generation: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.pick(&self.fail_reads).lookup(generation, key).await
    }

    async fn count(&self, generation: &str) -> Result<u64, Error> {
        self.pick(&self.fail_reads).count(generation).await
    }
}
