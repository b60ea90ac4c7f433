//! Build-cache addressing for the build orchestration step.
//!
//! Resolves where the remote build cache lives (a local directory, a
//! network host, or the tool's default) and how objects are keyed inside
//! a content-addressed store.

pub mod cas;
pub mod location;

pub use cas::CasKey;
pub use location::{
    AUTO_HOST_MARKER, CacheLocation, cache_host_to_http, resolve_cache_host, resolve_cache_path,
};

/// Errors from cache resolution.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid cache url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cache url {0:?} has no host")]
    MissingHost(String),

    #[error(transparent)]
    Digest(#[from] buildrelay_transfer::TransferError),
}
