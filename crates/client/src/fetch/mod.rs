//! Network access for the coordinator.
//!
//! ### Network trait
//! - `Network` is the seam between the coordinator and the outside world;
//!   tests substitute scripted implementations.
//!
//! ### HTTP implementation
//! - reqwest with rustls, compression, bounded redirects and a timeout.
//! - HTTP error statuses are responses, not failures: only transport errors,
//!   timeouts and oversized bodies fail a fetch, as a browser fetch would.
//! - Max body bytes: 5MB (configurable)

pub mod url;

use async_trait::async_trait;
use reqwest::Client;
use scribe_offline_core::AppConfig;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, identity, parse_origin, resolve};

use crate::request::{AssetRequest, AssetResponse, RequestMode, ResponseKind};

/// Failure of a network fetch, as the page would observe it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("response too large: {size} bytes exceeds {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout(err.to_string()) } else { FetchError::Network(err.to_string()) }
    }
}

/// Issues requests on behalf of the coordinator.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

/// Configuration for the HTTP network.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "scribe-offline/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "scribe-offline/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed network.
pub struct HttpNetwork {
    http: Client,
    config: FetchConfig,
}

impl HttpNetwork {
    /// Create a new HTTP network with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Build(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn check_size(&self, size: usize) -> Result<(), FetchError> {
        if size > self.config.max_bytes {
            return Err(FetchError::TooLarge { size, limit: self.config.max_bytes });
        }
        Ok(())
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        let start = Instant::now();

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;

        if let Some(len) = response.content_length() {
            self.check_size(len as usize)?;
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        self.check_size(body.len())?;

        let cross_origin = final_url.origin() != request.url.origin();
        let kind = match (cross_origin, request.mode) {
            (false, _) => ResponseKind::Basic,
            (true, RequestMode::NoCors) => ResponseKind::Opaque,
            (true, _) => ResponseKind::Cors,
        };
        // The final URL never carries the request's fragment.
        let redirected = identity(&final_url) != identity(&request.url);

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(AssetResponse { url: final_url, status, headers, body, kind, redirected })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn network() -> HttpNetwork {
        HttpNetwork::new(FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "scribe-offline/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "custom/1".into(), max_bytes: 1024, timeout_ms: 500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "custom/1");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app.css"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/css")
                    .set_body_string("body{}"),
            )
            .mount(&server)
            .await;

        let url = ::url::Url::parse(&format!("{}/app.css", server.uri())).unwrap();
        let response = network().fetch(&AssetRequest::get(url)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), b"body{}");
        assert_eq!(response.content_type(), Some("text/css"));
        assert_eq!(response.kind, ResponseKind::Basic);
        assert!(!response.redirected);
        assert!(response.is_cacheable());
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = ::url::Url::parse(&format!("{}/missing.js", server.uri())).unwrap();
        let response = network().fetch(&AssetRequest::get(url)).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!response.is_cacheable());
    }

    #[tokio::test]
    async fn test_redirect_marks_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let url = ::url::Url::parse(&format!("{}/old", server.uri())).unwrap();
        let response = network().fetch(&AssetRequest::get(url)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.redirected);
        assert_eq!(response.url.path(), "/new");
        assert!(!response.is_cacheable());
    }

    #[tokio::test]
    async fn test_fragment_is_not_a_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>notes</html>"))
            .mount(&server)
            .await;

        let url = ::url::Url::parse(&format!("{}/notes#top", server.uri())).unwrap();
        let response = network().fetch(&AssetRequest::navigate(url)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert!(!response.redirected);
        assert_eq!(response.url.fragment(), None);
        assert!(response.is_cacheable());
    }

    #[tokio::test]
    async fn test_post_body_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/inbox"))
            .and(body_string("note=hello"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let url = ::url::Url::parse(&format!("{}/api/inbox", server.uri())).unwrap();
        let request = AssetRequest::get(url).with_method(Method::POST).with_body("note=hello");
        let response = network().fetch(&request).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
            .mount(&server)
            .await;

        let network = HttpNetwork::new(FetchConfig { max_bytes: 1024, ..Default::default() }).unwrap();
        let url = ::url::Url::parse(&format!("{}/big.bin", server.uri())).unwrap();
        let result = network.fetch(&AssetRequest::get(url)).await;

        assert!(matches!(result, Err(FetchError::TooLarge { size: 2048, limit: 1024 })));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let server = MockServer::start().await;
        let url = ::url::Url::parse(&format!("{}/app.js", server.uri())).unwrap();
        drop(server);

        let result = network().fetch(&AssetRequest::get(url)).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
