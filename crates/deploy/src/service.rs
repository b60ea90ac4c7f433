//! Distribution service trait and its HTTP implementation.
//!
//! `DistributionService` is the seam between the orchestrator and the
//! network. The binary wires in [`HttpDistributionService`]; tests use
//! recording mocks.

use std::future::Future;
use std::pin::Pin;

use buildrelay_protocol::{BuildId, UploadTarget};
use buildrelay_transfer::ArtifactDescriptor;

use crate::client::TransactionClient;
use crate::error::DeployError;
use crate::transferer::ArtifactTransferer;
use crate::types::{Timeouts, UploadTransaction};

/// Boxed future returned by [`DistributionService`] methods.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DeployError>> + Send + 'a>>;

/// Abstract connection to the distribution service.
pub trait DistributionService: Send + Sync {
    /// Opens a transaction for `artifacts` on `channel`.
    fn init_transaction<'a>(
        &'a self,
        host: &'a str,
        token: &'a str,
        artifacts: &'a [ArtifactDescriptor],
        channel: &'a str,
    ) -> ServiceFuture<'a, UploadTransaction>;

    /// Uploads one artifact's bytes to its target.
    fn transfer<'a>(
        &'a self,
        artifact: &'a ArtifactDescriptor,
        target: &'a UploadTarget,
    ) -> ServiceFuture<'a, ()>;

    /// Commits the transaction, returning the install page if any.
    fn commit_transaction<'a>(
        &'a self,
        host: &'a str,
        token: &'a str,
        transaction_id: &'a BuildId,
    ) -> ServiceFuture<'a, Option<String>>;
}

/// HTTP-backed service sharing one injected `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpDistributionService {
    transactions: TransactionClient,
    transferer: ArtifactTransferer,
}

impl HttpDistributionService {
    /// Creates the service on top of `http` with the given call bounds.
    pub fn new(http: reqwest::Client, timeouts: Timeouts) -> Self {
        Self {
            transactions: TransactionClient::new(http.clone(), timeouts.metadata),
            transferer: ArtifactTransferer::new(http, timeouts.transfer),
        }
    }
}

impl DistributionService for HttpDistributionService {
    fn init_transaction<'a>(
        &'a self,
        host: &'a str,
        token: &'a str,
        artifacts: &'a [ArtifactDescriptor],
        channel: &'a str,
    ) -> ServiceFuture<'a, UploadTransaction> {
        Box::pin(self.transactions.init_transaction(host, token, artifacts, channel))
    }

    fn transfer<'a>(
        &'a self,
        artifact: &'a ArtifactDescriptor,
        target: &'a UploadTarget,
    ) -> ServiceFuture<'a, ()> {
        Box::pin(self.transferer.transfer(artifact, target))
    }

    fn commit_transaction<'a>(
        &'a self,
        host: &'a str,
        token: &'a str,
        transaction_id: &'a BuildId,
    ) -> ServiceFuture<'a, Option<String>> {
        Box::pin(self.transactions.commit_transaction(host, token, transaction_id))
    }
}

/// Builds the shared HTTP client used for every call of a run.
///
/// Timeouts are applied per request, so none is set here.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("buildrelay/", env!("CARGO_PKG_VERSION")))
        .build()
}
