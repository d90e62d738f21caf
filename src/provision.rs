//! Provisioning collaborator seam
//!
//! Compilation is pure; realizing the topology against a cloud API is the
//! job of a separate provisioning engine. That engine is injected through
//! the [`Provisioner`] trait - passed in by the caller, never looked up
//! globally - so the compile step stays testable without any cloud access.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::info;

use crate::cluster::{ClusterCompiler, ClusterTopology, DeploymentSpec};
use crate::network::Network;
use crate::Result;

/// Trait for engines that realize a compiled topology
///
/// Implementations own all cloud API interaction, retries and eventual
/// consistency handling; none of that leaks back into compilation.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Apply the topology, creating or updating the underlying resources
    async fn apply(&self, topology: &ClusterTopology) -> Result<()>;
}

/// Compile a declaration and hand the topology to the given provisioner
///
/// Compilation failures propagate before the provisioner is ever invoked;
/// no partial topology is applied.
pub async fn provision_with<P: Provisioner + ?Sized>(
    provisioner: &P,
    network: &Network,
    spec: &DeploymentSpec,
) -> Result<()> {
    let topology = ClusterCompiler::new(network).compile(spec)?;
    info!(
        cluster = %topology.cluster.name,
        services = topology.services.len(),
        "applying compiled topology"
    );
    provisioner.apply(&topology).await
}
