//! Shared cluster infrastructure and the top-level topology compiler
//!
//! The cluster compiler turns a [`DeploymentSpec`] into a complete
//! [`ClusterTopology`]: the shared cluster, instance role, launch
//! configuration and autoscaling group, plus one independent service
//! sub-topology per declared application. Compilation is a single-pass,
//! side-effect-free transformation; the only failure points are input
//! validation and the region image lookup, and on failure no partial
//! topology is returned.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{App, AppSpec};
use crate::iam::{ec2_trust_policy, InstanceProfile, Role, ECS_INSTANCE_POLICY_ARN};
use crate::naming::derived;
use crate::network::Network;
use crate::region::Region;
use crate::security::{cluster_ingress, SecurityGroup};
use crate::service::{ServiceCompiler, ServiceTopology};
use crate::{Error, Result};

/// Instance type every cluster instance launches as
pub const INSTANCE_TYPE: &str = "t2.micro";

/// Scale-activity cooldown for the autoscaling group, in seconds
pub const ASG_COOLDOWN_SECONDS: u32 = 300;

/// Bootstrap script template; `{{cluster}}` is the single substitution point
pub const USER_DATA_TEMPLATE: &str = "#!/bin/bash
echo ECS_CLUSTER={{cluster}} >> /etc/ecs/ecs.config
";

/// Render the bootstrap script for a cluster
///
/// Single variable substitution, no conditional logic.
fn render_user_data(cluster_name: &str) -> String {
    USER_DATA_TEMPLATE.replace("{{cluster}}", cluster_name)
}

// =============================================================================
// Input Declaration
// =============================================================================

/// Top-level deployment declaration
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Base name every shared resource name is derived from
    pub name: String,

    /// Application declarations, in deployment order
    pub apps: Vec<AppSpec>,

    /// Cluster instance count (default: one more than the app count)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl DeploymentSpec {
    /// Validate the declaration
    ///
    /// Duplicate application names would derive colliding resource names
    /// for every per-application resource, so they are rejected here.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for app in &self.apps {
            if !seen.insert(app.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate application name: {}",
                    app.name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Shared Resource Types
// =============================================================================

/// Declarative cluster resource
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Cluster name
    pub name: String,
    /// Region the cluster is bound to
    pub region: Region,
}

/// Launch configuration for cluster instances
///
/// Carries no name of its own; the provisioning layer assigns the physical
/// identifier when it realizes the configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfiguration {
    /// Machine image the instances boot from
    pub image_id: String,
    /// Instance type
    pub instance_type: String,
    /// Cluster-level security group
    pub security_group: SecurityGroup,
    /// Instance profile wrapping the cluster instance role
    pub instance_profile: InstanceProfile,
    /// Rendered bootstrap script
    pub user_data: String,
}

/// Health check source for the autoscaling group
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AsgHealthCheckType {
    /// Instance-level health reported by the compute layer
    Ec2,
    /// Health reported by an attached load balancer
    Elb,
}

/// Declarative autoscaling group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingGroup {
    /// Autoscaling group name
    pub name: String,
    /// Lower instance count bound
    pub min_size: u32,
    /// Upper instance count bound
    pub max_size: u32,
    /// Scale-activity cooldown in seconds
    pub cooldown_seconds: u32,
    /// Health check source; no load balancer is attached at this level
    pub health_check_type: AsgHealthCheckType,
    /// Subnets the instances are placed in
    pub subnets: Vec<String>,
    /// Launch configuration for new instances
    pub launch_configuration: LaunchConfiguration,
}

// =============================================================================
// Aggregate Output
// =============================================================================

/// The compiled deployment topology
///
/// This is the declarative handoff to the provisioning layer: the shared
/// cluster, one sub-topology per application in declaration order, and the
/// autoscaling group (which embeds the launch configuration, cluster
/// security group, instance profile and instance role).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopology {
    /// Shared cluster
    pub cluster: Cluster,
    /// Per-application sub-topologies, in input order
    pub services: Vec<ServiceTopology>,
    /// Shared autoscaling instance pool
    pub autoscaling_group: AutoscalingGroup,
}

impl ClusterTopology {
    /// Total count of top-level resources in the topology
    ///
    /// Cluster and autoscaling group, plus the five resources of each
    /// service sub-topology.
    pub fn resource_count(&self) -> usize {
        2 + self.services.len() * 5
    }

    /// Serialize the topology to YAML for the provisioning layer
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::serialization(e.to_string()))
    }
}

// =============================================================================
// Cluster Compiler
// =============================================================================

/// Top-level compiler from a [`DeploymentSpec`] to a [`ClusterTopology`]
///
/// Holds only a reference to the network; all state is in the inputs and
/// the returned topology.
pub struct ClusterCompiler<'a> {
    network: &'a Network,
}

impl<'a> ClusterCompiler<'a> {
    /// Create a compiler for the given network
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Compile a deployment declaration into a cluster topology
    ///
    /// Fails on duplicate application names and on regions without a
    /// machine image; in both cases no partial topology is returned.
    pub fn compile(&self, spec: &DeploymentSpec) -> Result<ClusterTopology> {
        spec.validate()?;

        let apps: Vec<App> = spec.apps.iter().cloned().map(AppSpec::normalize).collect();
        let size = spec.size.unwrap_or(apps.len() as u32 + 1);

        debug!(
            deployment = %spec.name,
            apps = apps.len(),
            size,
            region = %self.network.region,
            "compiling cluster topology"
        );

        let security_group = SecurityGroup {
            name: derived(&spec.name, "sg"),
            vpc: self.network.vpc.clone(),
            ingress: cluster_ingress(apps.iter().map(|app| app.port)),
        };

        let cluster = Cluster {
            name: derived(&spec.name, "cluster"),
            region: self.network.region,
        };

        // Baseline policy first, then every app's policies flattened in
        // application order. Concatenation, not set union: duplicates kept.
        let managed_policy_arns = std::iter::once(ECS_INSTANCE_POLICY_ARN.to_string())
            .chain(apps.iter().flat_map(|app| app.managed_policies.clone()))
            .collect();

        let instance_role = Role {
            name: derived(&spec.name, "instance-role"),
            assume_role_policy: ec2_trust_policy(),
            managed_policy_arns,
            inline_policies: vec![],
        };

        let launch_configuration = LaunchConfiguration {
            image_id: self.network.region.machine_image()?.to_string(),
            instance_type: INSTANCE_TYPE.to_string(),
            security_group,
            instance_profile: InstanceProfile {
                name: derived(&spec.name, "instance-profile"),
                role: instance_role,
            },
            user_data: render_user_data(&cluster.name),
        };

        let autoscaling_group = AutoscalingGroup {
            name: derived(&spec.name, "asg"),
            min_size: size,
            max_size: size,
            cooldown_seconds: ASG_COOLDOWN_SECONDS,
            health_check_type: AsgHealthCheckType::Ec2,
            subnets: self.network.private_subnets.clone(),
            launch_configuration,
        };

        let services = apps
            .iter()
            .map(|app| ServiceCompiler::compile(self.network, &cluster, app))
            .collect();

        Ok(ClusterTopology {
            cluster,
            services,
            autoscaling_group,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
