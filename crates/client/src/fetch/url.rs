//! URL resolution and canonicalization for request identities.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve an absolute or origin-relative URL against `origin`.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against the origin
/// 3. Reject anything but http/https
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
///
/// Host lowercasing and default-port removal come from the URL parser.
pub fn resolve(origin: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Parse a configured origin, reduced to scheme, host and port.
pub fn parse_origin(input: &str) -> Result<Url, UrlError> {
    let parsed = Url::parse(input.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    Url::parse(&parsed.origin().ascii_serialization()).map_err(|e| UrlError::InvalidUrl(e.to_string()))
}

/// URL string used as the request identity: the URL without its fragment.
pub fn identity(url: &Url) -> String {
    if url.fragment().is_none() {
        return url.to_string();
    }
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped.to_string()
}
