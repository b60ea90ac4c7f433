use std::path::{Path, PathBuf};

use buildrelay_protocol::{ArtifactRole, FileManifestEntry};

use crate::TransferError;
use crate::digest::{ContentDigest, digest_file};

/// A local artifact ready to be announced and uploaded.
///
/// `digest` and `size_bytes` are computed from the same read of the file.
/// The file must not change between digesting and transfer; the
/// transferer checks the size again before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub role: ArtifactRole,
    pub path: PathBuf,
    /// Base name of `path`, used for display and remote bookkeeping.
    pub filename: String,
    pub size_bytes: u64,
    pub digest: ContentDigest,
}

impl ArtifactDescriptor {
    /// Digests the file at `path` and builds its descriptor.
    pub fn from_file(role: ArtifactRole, path: &Path) -> Result<Self, TransferError> {
        crate::validate_artifact_path(path)?;
        let (digest, size_bytes) = digest_file(path)?;

        Ok(Self {
            role,
            path: path.to_path_buf(),
            filename: file_name_of(path),
            size_bytes,
            digest,
        })
    }

    /// Manifest entry announced to the service at init.
    pub fn manifest_entry(&self) -> FileManifestEntry {
        FileManifestEntry {
            filename: self.filename.clone(),
            size: self.size_bytes,
            sha256: self.digest.as_hex().to_string(),
        }
    }

    /// Fails if the file's current length differs from the digested one.
    pub fn ensure_unchanged(&self, current_len: u64) -> Result<(), TransferError> {
        if current_len != self.size_bytes {
            return Err(TransferError::SizeMismatch {
                path: self.path.clone(),
                expected: self.size_bytes,
                actual: current_len,
            });
        }
        Ok(())
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
