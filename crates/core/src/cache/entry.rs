//! Stored request identities and captured responses.

use serde::{Deserialize, Serialize};

use super::hash::compute_entry_key;

/// Normalized identity of a cached request: method plus absolute canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into().to_ascii_uppercase(), url: url.into() }
    }

    /// Identity of a GET request, the only method that is ever cached.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Storage key for this identity.
    pub fn digest(&self) -> String {
        compute_entry_key(&self.method, &self.url)
    }
}

/// A captured response as persisted in a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// Final URL the response was served from.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

impl StoredResponse {
    /// Value of the first header matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
