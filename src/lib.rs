//! Flotilla - compiles application declarations into a deployable
//! container-cluster topology
//!
//! Callers hand in a [`network::Network`] reference, a list of application
//! declarations and an optional cluster size; the compiler wires up a
//! shared cluster, an autoscaling instance pool and one independent
//! sub-topology per application (security group, load balancer, task
//! definition, IAM role, service descriptor). The output is purely
//! declarative: nothing here talks to a cloud API, and realizing the
//! topology belongs to a provisioning engine injected through
//! [`provision::Provisioner`].
//!
//! # Modules
//!
//! - [`app`] - application declarations and their normalized form
//! - [`cluster`] - shared infrastructure types and the top-level compiler
//! - [`service`] - per-application resource types and compiler
//! - [`region`] - region codes and the machine image table
//! - [`security`] - ingress rule composition
//! - [`iam`] - IAM role types and the fixed policy documents
//! - [`naming`] - deterministic resource-name derivation
//! - [`network`] - the network reference consumed from the network layer
//! - [`provision`] - the provisioning collaborator seam
//! - [`error`] - error types

#![deny(missing_docs)]

pub mod app;
pub mod cluster;
pub mod error;
pub mod iam;
pub mod naming;
pub mod network;
pub mod provision;
pub mod region;
pub mod security;
pub mod service;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// Defaults applied during application normalization. Centralizing them here
// keeps the normalizer and test fixtures consistent.

/// Default container listening port when a declaration omits one
pub const DEFAULT_APP_PORT: u16 = 8000;

/// Default container memory limit in MB when a declaration omits one
pub const DEFAULT_APP_MEMORY_MB: u32 = 256;
