//! Where the build cache lives.
//!
//! A cache address is either a network host (`grpc://cache.example:9092`,
//! possibly templated with [`AUTO_HOST_MARKER`]) or a local directory
//! written as a `file://` reference. An explicit cache directory always
//! takes precedence over either.

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::CacheError;

/// Placeholder in a host template that is replaced by `localhost`.
pub const AUTO_HOST_MARKER: &str = "@auto";

const FILE_SCHEME_PREFIX: &str = "file://";

/// Port the cache serves plain HTTP on.
const HTTP_CACHE_PORT: u16 = 8080;

/// Resolved cache location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// A directory on the local filesystem.
    Local(PathBuf),
    /// A network cache host, templates already substituted.
    Remote(String),
    /// Nothing configured; the build tool's default applies.
    Default,
}

impl CacheLocation {
    /// Combines [`resolve_cache_path`] and [`resolve_cache_host`].
    ///
    /// A local directory wins over a remote host.
    pub fn resolve(host_or_path: Option<&str>, cache_dir: Option<&Path>) -> Self {
        let location = if let Some(path) = resolve_cache_path(host_or_path, cache_dir) {
            CacheLocation::Local(path)
        } else if let Some(host) = resolve_cache_host(host_or_path) {
            CacheLocation::Remote(host)
        } else {
            CacheLocation::Default
        };
        debug!(?location, "resolved build cache location");
        location
    }
}

/// Returns the network host to use, or `None` for default/local resolution.
///
/// `file://` references are local and yield `None`. Only the first
/// [`AUTO_HOST_MARKER`] is substituted.
pub fn resolve_cache_host(cache_host: Option<&str>) -> Option<String> {
    let host = cache_host?;
    if host.starts_with(FILE_SCHEME_PREFIX) {
        return None;
    }
    Some(host.replacen(AUTO_HOST_MARKER, "localhost", 1))
}

/// Returns the local cache directory, if any.
pub fn resolve_cache_path(host_or_path: Option<&str>, cache_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = cache_dir {
        return Some(dir.to_path_buf());
    }
    host_or_path?
        .strip_prefix(FILE_SCHEME_PREFIX)
        .map(PathBuf::from)
}

/// Rewrites a gRPC cache address to the cache's HTTP endpoint.
///
/// The scheme becomes `http` and the port 8080; host, path, query and
/// fragment are kept.
pub fn cache_host_to_http(grpc_url: &str) -> Result<String, CacheError> {
    let parsed = Url::parse(grpc_url).map_err(|source| CacheError::InvalidUrl {
        url: grpc_url.to_string(),
        source,
    })?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CacheError::MissingHost(grpc_url.to_string()))?;

    let mut out = format!("http://{host}:{HTTP_CACHE_PORT}{}", parsed.path());
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = parsed.fragment().filter(|f| !f.is_empty()) {
        out.push('#');
        out.push_str(fragment);
    }
    Ok(out)
}
