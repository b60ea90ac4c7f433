//! Streams one artifact's bytes to its upload target.

use std::time::Duration;

use buildrelay_protocol::UploadTarget;
use buildrelay_transfer::{ArtifactDescriptor, DIGEST_CHUNK_SIZE, TransferError};
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::{DeployError, ServiceFailure};

/// Uploads artifacts with a single streamed `PUT` each.
///
/// The file is opened once and read sequentially; it is never buffered
/// whole in memory. `Content-Length` is always the exact file size, so the
/// receiver can check completeness without chunked framing.
#[derive(Debug, Clone)]
pub struct ArtifactTransferer {
    http: reqwest::Client,
    timeout: Duration,
}

impl ArtifactTransferer {
    /// Creates a transferer that bounds each upload by `timeout`.
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Sends `artifact` to `target`.
    ///
    /// Fails without sending anything if the file's size no longer matches
    /// the digested size. A failed transfer is not resumed.
    pub async fn transfer(
        &self,
        artifact: &ArtifactDescriptor,
        target: &UploadTarget,
    ) -> Result<(), DeployError> {
        if target.url.is_empty() {
            return Err(DeployError::Protocol(format!(
                "empty upload url for {} artifact",
                artifact.role
            )));
        }
        let mut headers = service_headers(target)?;

        let file = tokio::fs::File::open(&artifact.path)
            .await
            .map_err(|source| TransferError::FileAccess {
                path: artifact.path.clone(),
                source,
            })?;
        let size = file
            .metadata()
            .await
            .map_err(|source| TransferError::FileAccess {
                path: artifact.path.clone(),
                source,
            })?
            .len();
        artifact.ensure_unchanged(size)?;

        // Ours wins over any service-supplied length.
        headers.insert(CONTENT_LENGTH, HeaderValue::from(size));

        info!(
            role = %artifact.role,
            file = %artifact.filename,
            bytes = size,
            "uploading artifact"
        );

        let body = reqwest::Body::wrap_stream(ReaderStream::with_capacity(file, DIGEST_CHUNK_SIZE));
        let resp = self
            .http
            .put(&target.url)
            .headers(headers)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| transfer_error(artifact, e.into()))?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(transfer_error(
                artifact,
                ServiceFailure::status(status.as_u16(), &body),
            ));
        }

        debug!(role = %artifact.role, status = status.as_u16(), "artifact uploaded");
        Ok(())
    }
}

/// Converts the service-supplied header map, rejecting invalid entries.
fn service_headers(target: &UploadTarget) -> Result<HeaderMap, DeployError> {
    let mut headers = HeaderMap::with_capacity(target.headers.len() + 1);
    for (name, value) in &target.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| DeployError::Protocol(format!("invalid upload header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| DeployError::Protocol(format!("invalid value for upload header {name}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn transfer_error(artifact: &ArtifactDescriptor, failure: ServiceFailure) -> DeployError {
    DeployError::ArtifactTransfer {
        role: artifact.role,
        filename: artifact.filename.clone(),
        failure,
    }
}
