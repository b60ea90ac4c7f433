use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{ArtifactRole, BuildId};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Metadata for one artifact in the init manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifestEntry {
    pub filename: String,
    pub size: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Opens an upload transaction.
///
/// `POST {host}/upload/init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitUploadRequest {
    pub files: BTreeMap<ArtifactRole, FileManifestEntry>,
    pub channel: String,
}

/// Finalizes an upload transaction.
///
/// `POST {host}/upload/commit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitUploadRequest {
    /// Echoed exactly as the init response carried it.
    #[serde(rename = "buildId")]
    pub build_id: BuildId,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Where and how to send one artifact's bytes.
///
/// Opaque beyond its use as request parameters: the URL may point at any
/// storage backend and the headers typically carry pre-signed fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadTarget {
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

/// Response to [`InitUploadRequest`].
///
/// Every field is optional on the wire; presence is enforced by the
/// client so that a contract violation surfaces as a protocol error
/// rather than a JSON error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InitUploadResponse {
    /// Kept as raw JSON and interpreted by `build_id()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<serde_json::Value>,
    /// Keyed by role wire name; unknown keys are tolerated.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub upload_urls: HashMap<String, UploadTarget>,
}

impl InitUploadResponse {
    /// Returns the build id if present and usable.
    pub fn build_id(&self) -> Option<BuildId> {
        self.build_id.as_ref().and_then(BuildId::from_value)
    }

    /// Returns the upload target for `role`, if the service issued one.
    ///
    /// The canonical key wins over an alias.
    pub fn target_for(&self, role: ArtifactRole) -> Option<&UploadTarget> {
        std::iter::once(role.wire_name())
            .chain(role.wire_aliases().iter().copied())
            .find_map(|key| self.upload_urls.get(key))
    }
}

/// Response to [`CommitUploadRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitUploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_page_url: Option<String>,
}

impl CommitUploadResponse {
    /// Returns the install page reference if present and non-empty.
    pub fn install_page_url(&self) -> Option<&str> {
        self.install_page_url.as_deref().filter(|u| !u.is_empty())
    }
}
