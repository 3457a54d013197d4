//! Intercepted requests and the responses handed back to the page.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use scribe_offline_core::{Error, RequestKey, StoredResponse};
use url::Url;

use crate::fetch::url::identity;

/// How the page issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

/// An outgoing request from a controlled page.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl AssetRequest {
    /// A GET for a subresource.
    pub fn get(url: Url) -> Self {
        Self { method: Method::GET, url, mode: RequestMode::SameOrigin, headers: HeaderMap::new(), body: None }
    }

    /// A top-level document load.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.as_str(), identity(&self.url))
    }
}

/// Response type as a page would see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Basic,
    Cors,
    /// Cross-origin no-cors response; status and body are not inspectable.
    Opaque,
    Error,
}

/// A response returned to the page, live from the network or rebuilt from the store.
#[derive(Debug, Clone)]
pub struct AssetResponse {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub kind: ResponseKind,
    pub redirected: bool,
}

impl AssetResponse {
    /// Whether read-through population may store this response.
    ///
    /// Only plain 200s qualify: never partial, redirected, opaque or error responses.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
            && matches!(self.kind, ResponseKind::Basic | ResponseKind::Cors)
            && !self.redirected
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Capture this response for the store.
    pub fn to_stored(&self) -> StoredResponse {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();

        StoredResponse {
            url: self.url.to_string(),
            status: self.status.as_u16(),
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: self.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl TryFrom<StoredResponse> for AssetResponse {
    type Error = Error;

    fn try_from(stored: StoredResponse) -> Result<Self, Self::Error> {
        let url = Url::parse(&stored.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", stored.url)))?;
        let status = StatusCode::from_u16(stored.status)
            .map_err(|e| Error::InvalidInput(format!("stored status {}: {e}", stored.status)))?;

        let mut headers = HeaderMap::with_capacity(stored.headers.len());
        for (name, value) in &stored.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidInput(format!("stored header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidInput(format!("stored header value for {name}: {e}")))?;
            headers.append(name, value);
        }

        Ok(Self { url, status, headers, body: Bytes::from(stored.body), kind: ResponseKind::Basic, redirected: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, kind: ResponseKind) -> AssetResponse {
        AssetResponse {
            url: Url::parse("http://localhost:3000/app.js").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from_static(b"console.log(1)"),
            kind,
            redirected: false,
        }
    }

    #[test]
    fn test_cacheable_only_plain_200() {
        assert!(response(200, ResponseKind::Basic).is_cacheable());
        assert!(response(200, ResponseKind::Cors).is_cacheable());
        assert!(!response(200, ResponseKind::Opaque).is_cacheable());
        assert!(!response(200, ResponseKind::Error).is_cacheable());
        assert!(!response(206, ResponseKind::Basic).is_cacheable());
        assert!(!response(404, ResponseKind::Basic).is_cacheable());
        assert!(!response(500, ResponseKind::Basic).is_cacheable());

        let mut redirected = response(200, ResponseKind::Basic);
        redirected.redirected = true;
        assert!(!redirected.is_cacheable());
    }

    #[test]
    fn test_stored_round_trip_preserves_status_headers_body() {
        let mut original = response(200, ResponseKind::Basic);
        original
            .headers
            .insert(reqwest::header::CONTENT_TYPE, HeaderValue::from_static("application/javascript"));

        let stored = original.to_stored();
        assert_eq!(stored.status_text, "OK");

        let restored = AssetResponse::try_from(stored).unwrap();
        assert_eq!(restored.status, original.status);
        assert_eq!(restored.body, original.body);
        assert_eq!(restored.url, original.url);
        assert_eq!(restored.content_type(), Some("application/javascript"));
    }

    #[test]
    fn test_restore_rejects_bad_header() {
        let mut stored = response(200, ResponseKind::Basic).to_stored();
        stored.headers.push(("bad header".into(), "x".into()));
        assert!(AssetResponse::try_from(stored).is_err());
    }

    #[test]
    fn test_request_key_ignores_fragment() {
        let request = AssetRequest::navigate(Url::parse("http://localhost:3000/notes#top").unwrap());
        assert_eq!(request.key(), RequestKey::get("http://localhost:3000/notes"));
        assert!(request.is_navigation());
    }
}
