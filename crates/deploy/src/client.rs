//! Transaction lifecycle calls against the distribution service.
//!
//! The only component that talks to `/upload/init` and `/upload/commit`.
//! Each call is issued exactly once; there is no automatic retry.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use buildrelay_protocol::constants::{COMMIT_UPLOAD_PATH, INIT_UPLOAD_PATH, endpoint_url};
use buildrelay_protocol::{
    ArtifactRole, BuildId, CommitUploadRequest, CommitUploadResponse, InitUploadRequest,
    InitUploadResponse,
};
use buildrelay_transfer::ArtifactDescriptor;
use tracing::{debug, warn};

use crate::error::{DeployError, ServiceFailure};
use crate::types::UploadTransaction;

/// Opens and commits upload transactions.
///
/// Holds an injected `reqwest::Client`; the bearer token is attached per
/// request so the same client can be shared with the artifact transferer,
/// whose upload targets must not receive it.
#[derive(Clone)]
pub struct TransactionClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for TransactionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TransactionClient {
    /// Creates a client that bounds each call by `timeout`.
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Announces the artifacts and opens a transaction.
    pub async fn init_transaction(
        &self,
        host: &str,
        token: &str,
        artifacts: &[ArtifactDescriptor],
        channel: &str,
    ) -> Result<UploadTransaction, DeployError> {
        let req = InitUploadRequest {
            files: artifacts
                .iter()
                .map(|a| (a.role, a.manifest_entry()))
                .collect(),
            channel: channel.to_string(),
        };

        let url = endpoint_url(host, INIT_UPLOAD_PATH);
        debug!(url = %url, files = req.files.len(), channel = %channel, "init transaction");

        let body = self
            .post_json(&url, token, &req)
            .await
            .map_err(DeployError::TransactionInit)?;

        let resp: InitUploadResponse = serde_json::from_slice(&body)
            .map_err(|e| DeployError::Protocol(format!("malformed init response: {e}")))?;

        let Some(build_id) = resp.build_id() else {
            return Err(DeployError::Protocol("no build_id in init response".into()));
        };

        for key in resp.upload_urls.keys() {
            if ArtifactRole::from_wire_name(key).is_none() {
                debug!(key = %key, "ignoring upload target for unknown role");
            }
        }
        let upload_targets: HashMap<_, _> = ArtifactRole::ALL
            .into_iter()
            .filter_map(|role| resp.target_for(role).map(|t| (role, t.clone())))
            .collect();

        Ok(UploadTransaction {
            transaction_id: build_id,
            upload_targets,
        })
    }

    /// Commits the transaction and returns the install page reference.
    ///
    /// A response without a usable reference is a degraded success: the
    /// artifacts are already uploaded, so `Ok(None)` is returned.
    pub async fn commit_transaction(
        &self,
        host: &str,
        token: &str,
        transaction_id: &BuildId,
    ) -> Result<Option<String>, DeployError> {
        let req = CommitUploadRequest {
            build_id: transaction_id.clone(),
        };

        let url = endpoint_url(host, COMMIT_UPLOAD_PATH);
        debug!(url = %url, build_id = %transaction_id, "commit transaction");

        let body = self
            .post_json(&url, token, &req)
            .await
            .map_err(DeployError::TransactionCommit)?;

        match serde_json::from_slice::<CommitUploadResponse>(&body) {
            Ok(resp) => Ok(resp.install_page_url().map(str::to_string)),
            Err(e) => {
                warn!(error = %e, "commit response is not valid JSON");
                Ok(None)
            }
        }
    }

    /// Performs an authenticated JSON POST and returns the raw success body.
    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        payload: &T,
    ) -> Result<Vec<u8>, ServiceFailure> {
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceFailure::status(status.as_u16(), &body));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
