//! Deploy orchestrator.
//!
//! Drives one deployment through a linear sequence of phases:
//!
//! `Validating → Digesting → Initializing → Transferring(primary)
//!  → [Transferring(debug symbols)] → Committing → Done`
//!
//! Each phase runs exactly once and the first failure ends the run. An
//! abandoned transaction is left for the service to reclaim.

use buildrelay_protocol::ArtifactRole;
use buildrelay_transfer::ArtifactDescriptor;
use tracing::{debug, info, warn};

use crate::error::{DeployError, DeployFailure, DeployPhase};
use crate::service::DistributionService;
use crate::types::{DeploymentRequest, DeploymentResult};

/// Runs deployments against a [`DistributionService`].
pub struct DeployOrchestrator<'a> {
    service: &'a dyn DistributionService,
}

impl<'a> DeployOrchestrator<'a> {
    /// Creates an orchestrator driving `service`.
    pub fn new(service: &'a dyn DistributionService) -> Self {
        Self { service }
    }

    /// Runs the full deployment for `request`.
    pub async fn deploy(
        &self,
        request: &DeploymentRequest,
    ) -> Result<DeploymentResult, DeployFailure> {
        // 1. Validate
        enter(DeployPhase::Validating);
        request.validate().map_err(at(DeployPhase::Validating))?;

        // 2. Digest
        enter(DeployPhase::Digesting);
        let artifacts = digest_artifacts(request)
            .await
            .map_err(at(DeployPhase::Digesting))?;

        // 3. Init
        enter(DeployPhase::Initializing);
        let transaction = self
            .service
            .init_transaction(
                &request.destination_host,
                &request.auth_token,
                &artifacts,
                &request.channel,
            )
            .await
            .map_err(at(DeployPhase::Initializing))?;
        info!(build_id = %transaction.transaction_id, "transaction opened");

        if !transaction
            .upload_targets
            .contains_key(&ArtifactRole::Primary)
        {
            return Err(DeployFailure::new(
                DeployPhase::Initializing,
                DeployError::Protocol("no upload target for primary artifact".into()),
            ));
        }

        // 4. Transfer, primary first
        let mut skipped = Vec::new();
        for artifact in &artifacts {
            let phase = DeployPhase::Transferring(artifact.role);
            let Some(target) = transaction.upload_targets.get(&artifact.role) else {
                warn!(
                    role = %artifact.role,
                    file = %artifact.filename,
                    "service issued no upload target, skipping artifact"
                );
                skipped.push(artifact.role);
                continue;
            };

            enter(phase);
            self.service
                .transfer(artifact, target)
                .await
                .map_err(at(phase))?;
        }

        // 5. Commit
        enter(DeployPhase::Committing);
        let install_page_url = self
            .service
            .commit_transaction(
                &request.destination_host,
                &request.auth_token,
                &transaction.transaction_id,
            )
            .await
            .map_err(at(DeployPhase::Committing))?;

        match install_page_url {
            Some(ref url) => info!(url = %url, "deployment committed"),
            None => warn!("deployment committed but the service returned no install page"),
        }

        Ok(DeploymentResult {
            build_id: transaction.transaction_id,
            install_page_url,
            skipped,
        })
    }
}

/// Digests every supplied artifact, primary first.
async fn digest_artifacts(
    request: &DeploymentRequest,
) -> Result<Vec<ArtifactDescriptor>, DeployError> {
    let mut artifacts = Vec::new();
    for (role, path) in request.artifact_paths() {
        let descriptor =
            tokio::task::spawn_blocking(move || ArtifactDescriptor::from_file(role, &path))
                .await??;
        debug!(
            role = %descriptor.role,
            file = %descriptor.filename,
            bytes = descriptor.size_bytes,
            sha256 = %descriptor.digest,
            "artifact digested"
        );
        artifacts.push(descriptor);
    }
    Ok(artifacts)
}

fn enter(phase: DeployPhase) {
    info!(phase = %phase, "deploy phase");
}

fn at(phase: DeployPhase) -> impl Fn(DeployError) -> DeployFailure {
    move |source| DeployFailure::new(phase, source)
}
