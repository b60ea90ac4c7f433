//! Deploy error types.

use std::fmt;

use buildrelay_protocol::ArtifactRole;
use buildrelay_protocol::constants::ERROR_BODY_LIMIT;
use buildrelay_transfer::TransferError;

/// Why a call to the distribution service failed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceFailure {
    /// The service answered with a non-success status.
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// No usable response: connection error, timeout, or broken body.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
}

impl ServiceFailure {
    /// Builds a status failure, keeping only a diagnostic prefix of `body`.
    pub fn status(status: u16, body: &str) -> Self {
        ServiceFailure::Status {
            status,
            body: truncate_body(body),
        }
    }

    /// HTTP status code, if the service responded at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceFailure::Status { status, .. } => Some(*status),
            ServiceFailure::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Returns `true` if the call hit its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServiceFailure::Request(e) if e.is_timeout())
    }
}

/// Errors produced during a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    FileAccess(#[from] TransferError),

    #[error("init request failed: {0}")]
    TransactionInit(#[source] ServiceFailure),

    #[error("commit request failed: {0}")]
    TransactionCommit(#[source] ServiceFailure),

    #[error("upload of {role} artifact {filename} failed: {failure}")]
    ArtifactTransfer {
        role: ArtifactRole,
        filename: String,
        #[source]
        failure: ServiceFailure,
    },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("task join error: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Step of the deployment state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Validating,
    Digesting,
    Initializing,
    Transferring(ArtifactRole),
    Committing,
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployPhase::Validating => f.write_str("validation"),
            DeployPhase::Digesting => f.write_str("digesting artifacts"),
            DeployPhase::Initializing => f.write_str("transaction init"),
            DeployPhase::Transferring(role) => write!(f, "{role} artifact transfer"),
            DeployPhase::Committing => f.write_str("transaction commit"),
        }
    }
}

/// The first failure of a deployment run, tagged with the phase it hit.
#[derive(Debug, thiserror::Error)]
#[error("{phase} failed: {source}")]
pub struct DeployFailure {
    pub phase: DeployPhase,
    #[source]
    pub source: DeployError,
}

impl DeployFailure {
    pub fn new(phase: DeployPhase, source: DeployError) -> Self {
        Self { phase, source }
    }

    /// Returns `true` when every artifact was uploaded but the transaction
    /// was not committed. Recovery should restart from the commit.
    pub fn is_uncommitted(&self) -> bool {
        self.phase == DeployPhase::Committing
    }
}

/// Keeps at most [`ERROR_BODY_LIMIT`] characters of a response body.
pub fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
