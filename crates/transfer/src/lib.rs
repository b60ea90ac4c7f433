//! Streamed content digests and artifact descriptors.
//!
//! Files are hashed in fixed-size chunks so memory use does not depend on
//! artifact size. A descriptor's digest and size come from the same read.

mod digest;
mod types;
mod validation;

use std::path::PathBuf;

pub use digest::{ContentDigest, digest_bytes, digest_file, digest_reader};
pub use types::ArtifactDescriptor;
pub use validation::validate_artifact_path;

/// Read size used when digesting and streaming artifacts: 64 KiB.
pub const DIGEST_CHUNK_SIZE: usize = 64 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error(
        "{} changed since digesting: expected {expected} bytes, found {actual}",
        path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

impl TransferError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransferError::FileAccess {
            path: path.into(),
            source,
        }
    }
}
