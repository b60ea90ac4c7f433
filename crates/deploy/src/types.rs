//! Data types for the deploy flow.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use buildrelay_protocol::constants::{METADATA_TIMEOUT, TRANSFER_TIMEOUT};
use buildrelay_protocol::{ArtifactRole, BuildId, UploadTarget};
use buildrelay_transfer::validate_artifact_path;

use crate::error::DeployError;

/// Everything needed for one deployment run.
#[derive(Clone)]
pub struct DeploymentRequest {
    pub primary_artifact_path: PathBuf,
    pub debug_artifact_path: Option<PathBuf>,
    /// Base URL of the distribution service.
    pub destination_host: String,
    /// Opaque bearer credential.
    pub auth_token: String,
    /// Release channel, e.g. `beta` or `internal`.
    pub channel: String,
}

impl fmt::Debug for DeploymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeploymentRequest")
            .field("primary_artifact_path", &self.primary_artifact_path)
            .field("debug_artifact_path", &self.debug_artifact_path)
            .field("destination_host", &self.destination_host)
            .field("auth_token", &"[REDACTED]")
            .field("channel", &self.channel)
            .finish()
    }
}

impl DeploymentRequest {
    /// Rejects the request before any network call is made.
    ///
    /// Checks that every required field is non-empty, that the host is an
    /// absolute http(s) URL, and that every supplied artifact path names an
    /// existing regular file.
    pub fn validate(&self) -> Result<(), DeployError> {
        require_non_empty("host", &self.destination_host)?;
        require_non_empty("auth_token", &self.auth_token)?;
        require_non_empty("channel", &self.channel)?;

        let url = reqwest::Url::parse(self.destination_host.trim()).map_err(|e| {
            DeployError::Configuration(format!("invalid host {:?}: {e}", self.destination_host))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DeployError::Configuration(format!(
                "host must use http or https, got {:?}",
                url.scheme()
            )));
        }

        validate_artifact_path(&self.primary_artifact_path)?;
        if let Some(ref debug_path) = self.debug_artifact_path {
            validate_artifact_path(debug_path)?;
        }

        Ok(())
    }

    /// Artifacts to deploy, primary first.
    pub fn artifact_paths(&self) -> Vec<(ArtifactRole, PathBuf)> {
        let mut paths = vec![(ArtifactRole::Primary, self.primary_artifact_path.clone())];
        if let Some(ref debug_path) = self.debug_artifact_path {
            paths.push((ArtifactRole::DebugSymbols, debug_path.clone()));
        }
        paths
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DeployError> {
    if value.trim().is_empty() {
        return Err(DeployError::Configuration(format!("{field} is missing or empty")));
    }
    Ok(())
}

/// A server-assigned upload transaction.
///
/// Lives only for the duration of one run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTransaction {
    pub transaction_id: BuildId,
    pub upload_targets: HashMap<ArtifactRole, UploadTarget>,
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub build_id: BuildId,
    /// Human-facing install page; `None` if the service did not return one.
    pub install_page_url: Option<String>,
    /// Supplied artifacts the service issued no upload target for.
    pub skipped: Vec<ArtifactRole>,
}

/// Upper bounds for network calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Transaction init and commit.
    pub metadata: Duration,
    /// A single artifact upload.
    pub transfer: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            metadata: METADATA_TIMEOUT,
            transfer: TRANSFER_TIMEOUT,
        }
    }
}
