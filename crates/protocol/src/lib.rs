//! Wire protocol of the build distribution service.
//!
//! A deployment is a three-call transaction over HTTP with JSON bodies:
//! `POST /upload/init`, one `PUT` per artifact to the returned upload
//! target, and `POST /upload/commit`.

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use messages::{
    CommitUploadRequest, CommitUploadResponse, FileManifestEntry, InitUploadRequest,
    InitUploadResponse, UploadTarget,
};
pub use types::{ArtifactRole, BuildId};
