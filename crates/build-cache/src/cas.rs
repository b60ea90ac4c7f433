//! Two-level content-addressed keys.
//!
//! Objects are sharded by the first two hex characters of their digest:
//! `ab/abcdef...`.

use std::fmt;
use std::path::{Path, PathBuf};

use buildrelay_transfer::{ContentDigest, digest_file};

use crate::CacheError;

const SHARD_LEN: usize = 2;

/// Storage key of one cache object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CasKey {
    shard: String,
    object: String,
}

impl CasKey {
    pub fn from_digest(digest: &ContentDigest) -> Self {
        let hex = digest.as_hex();
        Self {
            shard: hex[..SHARD_LEN].to_string(),
            object: hex.to_string(),
        }
    }

    /// Digests `path` and returns the key its contents would be stored under.
    pub fn for_file(path: &Path) -> Result<Self, CacheError> {
        let (digest, _) = digest_file(path)?;
        Ok(Self::from_digest(&digest))
    }

    pub fn shard(&self) -> &str {
        &self.shard
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// `shard/object`, relative to the store root.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.shard).join(&self.object)
    }

    /// Location of the object inside a local store rooted at `root`.
    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }
}

impl fmt::Display for CasKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.shard, self.object)
    }
}
