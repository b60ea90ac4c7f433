//! Build deployment against the distribution service.
//!
//! This crate implements the three-phase upload protocol. It is a library
//! crate with no CLI concerns; the binary injects the HTTP client and
//! supplies the [`DeploymentRequest`].
//!
//! # Pipeline
//!
//! 1. **Validate**: required fields present, artifact files exist
//! 2. **Digest**: SHA-256 and size of every artifact
//! 3. **Init**: open a transaction, receive per-artifact upload targets
//! 4. **Transfer**: stream each artifact to its target
//! 5. **Commit**: finalize the transaction, receive the install page

pub mod client;
pub mod deploy;
pub mod error;
pub mod service;
pub mod transferer;
pub mod types;

// Re-export primary types for convenience.
pub use client::TransactionClient;
pub use deploy::DeployOrchestrator;
pub use error::{DeployError, DeployFailure, DeployPhase, ServiceFailure};
pub use service::{DistributionService, HttpDistributionService, ServiceFuture, build_http_client};
pub use transferer::ArtifactTransferer;
pub use types::{DeploymentRequest, DeploymentResult, Timeouts, UploadTransaction};
