//! Routing rules for intercepted requests, evaluated in order.

use reqwest::Method;
use url::Url;

use crate::request::AssetRequest;

/// Why a request is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassReason {
    /// Not a GET.
    Method,
    CrossOrigin,
    /// Path is under the remote backend prefix.
    ReservedPrefix,
}

/// Serving strategy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Bypass(BypassReason),
    /// Network first, cached entry then cached root on failure.
    Navigation,
    /// Cache first, read-through on miss.
    Asset,
}

/// Decide how to serve `request` for a coordinator on `origin`.
pub fn classify(request: &AssetRequest, origin: &Url, bypass_prefix: &str) -> Route {
    if request.method != Method::GET {
        return Route::Bypass(BypassReason::Method);
    }
    if request.url.origin() != origin.origin() {
        return Route::Bypass(BypassReason::CrossOrigin);
    }
    if request.url.path().starts_with(bypass_prefix) {
        return Route::Bypass(BypassReason::ReservedPrefix);
    }
    if request.is_navigation() { Route::Navigation } else { Route::Asset }
}
