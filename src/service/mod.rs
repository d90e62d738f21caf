//! Per-application resource types and the service compiler
//!
//! This module defines the resources that make up one application's
//! sub-topology and the compiler that derives them:
//! - [`SecurityGroup`]: per-application ingress (via [`crate::security`])
//! - [`LoadBalancer`]: internet-facing entry point
//! - [`TaskDefinition`]: container/task descriptor
//! - [`Role`]: service-level IAM role (via [`crate::iam`])
//! - [`Service`]: the service descriptor binding it all to the cluster
//!
//! Sub-topologies are independent of one another; the compiler is pure
//! construction with no failure paths and no cross-application state.

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::cluster::Cluster;
use crate::iam::{
    describe_instance_health_policy, ecs_trust_policy, InlinePolicy, Role, ECS_SERVICE_POLICY_ARN,
};
use crate::naming::derived;
use crate::network::Network;
use crate::region::Region;
use crate::security::{app_ingress, Protocol, SecurityGroup, HTTP_PORT};

/// Desired task count for every compiled service
pub const SERVICE_DESIRED_COUNT: u32 = 1;

/// Minimum healthy percent during a deployment
pub const DEPLOYMENT_MIN_HEALTHY_PERCENT: u32 = 60;

/// Maximum percent during a deployment
pub const DEPLOYMENT_MAX_PERCENT: u32 = 150;

/// Seconds between load balancer health checks
pub const HEALTH_CHECK_INTERVAL_SECONDS: u32 = 15;

/// Seconds before a single health check times out
pub const HEALTH_CHECK_TIMEOUT_SECONDS: u32 = 3;

/// Consecutive checks required for a healthy or unhealthy transition
pub const HEALTH_CHECK_THRESHOLD: u32 = 3;

// =============================================================================
// Load Balancer
// =============================================================================

/// Addressing scheme for a load balancer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// Reachable from the public internet
    InternetFacing,
    /// Reachable only inside the VPC
    Internal,
}

/// Listener mapping an external port to an instance port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    /// Protocol spoken on the external port
    pub protocol: Protocol,
    /// External port
    pub port: u16,
    /// Port traffic is forwarded to on the instances
    pub instance_port: u16,
}

/// Health check target (protocol and port probed on the instances)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckTarget {
    /// Probe protocol
    pub protocol: Protocol,
    /// Probed instance port
    pub port: u16,
}

/// Load balancer health check configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    /// Probe target
    pub target: HealthCheckTarget,
    /// Seconds between probes
    pub interval_seconds: u32,
    /// Seconds before a probe times out
    pub timeout_seconds: u32,
    /// Consecutive successes before an instance counts as healthy
    pub healthy_threshold: u32,
    /// Consecutive failures before an instance counts as unhealthy
    pub unhealthy_threshold: u32,
}

impl HealthCheck {
    /// TCP health check against the given instance port with the fixed
    /// interval, timeout and thresholds
    pub fn tcp(port: u16) -> Self {
        Self {
            target: HealthCheckTarget {
                protocol: Protocol::Tcp,
                port,
            },
            interval_seconds: HEALTH_CHECK_INTERVAL_SECONDS,
            timeout_seconds: HEALTH_CHECK_TIMEOUT_SECONDS,
            healthy_threshold: HEALTH_CHECK_THRESHOLD,
            unhealthy_threshold: HEALTH_CHECK_THRESHOLD,
        }
    }
}

/// Declarative load balancer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    /// Load balancer name
    pub name: String,
    /// Addressing scheme
    pub scheme: Scheme,
    /// Subnets the load balancer is placed in
    pub subnets: Vec<String>,
    /// Names of attached security groups
    pub security_groups: Vec<String>,
    /// Listeners
    pub listeners: Vec<Listener>,
    /// Health check configuration
    pub health_check: HealthCheck,
}

// =============================================================================
// Task Definition
// =============================================================================

/// Port mapping between a container and its host instance
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Port inside the container
    pub container_port: u16,
    /// Port on the host instance
    pub host_port: u16,
}

/// Log configuration directing container logs to a log group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    /// Target log group
    pub log_group: String,
    /// Region the log group lives in
    pub region: String,
}

/// One container inside a task definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    /// Container name
    pub name: String,
    /// Image reference
    pub image: String,
    /// Memory limit in MB
    pub memory: u32,
    /// Port mappings
    pub port_mappings: Vec<PortMapping>,
    /// Log configuration
    pub log_configuration: LogConfiguration,
}

/// Declarative task definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Task family name
    pub family: String,
    /// Region the task definition is registered in
    pub region: Region,
    /// Container definitions
    pub container_definitions: Vec<ContainerDefinition>,
}

// =============================================================================
// Service
// =============================================================================

/// Container/port binding attaching a load balancer to a service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLoadBalancer {
    /// Container the traffic is routed to
    pub container_name: String,
    /// Container port the traffic is routed to
    pub container_port: u16,
    /// Attached load balancer name
    pub load_balancer_name: String,
}

/// Rollout limits applied when the service is updated
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfiguration {
    /// Lowest percent of desired tasks kept running during a rollout
    pub minimum_healthy_percent: u32,
    /// Highest percent of desired tasks allowed during a rollout
    pub maximum_percent: u32,
}

/// Declarative service descriptor binding a task to the owning cluster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service name
    pub name: String,
    /// Owning cluster name
    pub cluster: String,
    /// Task definition family the service runs
    pub task_definition: String,
    /// Number of task copies kept running
    pub desired_count: u32,
    /// Service role name
    pub role: String,
    /// Load balancer attachments
    pub load_balancers: Vec<ServiceLoadBalancer>,
    /// Rollout limits
    pub deployment_configuration: DeploymentConfiguration,
}

/// One application's complete sub-topology
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTopology {
    /// Per-application security group
    pub security_group: SecurityGroup,
    /// Internet-facing load balancer
    pub load_balancer: LoadBalancer,
    /// Task definition
    pub task_definition: TaskDefinition,
    /// Service-level IAM role
    pub role: Role,
    /// Service descriptor (references the owning cluster by name)
    pub service: Service,
}

// =============================================================================
// Service Compiler
// =============================================================================

/// Compiler for one application's sub-topology
///
/// Derives the security group, load balancer, task definition, IAM role
/// and service descriptor for a single normalized application. Purely
/// constructive; given valid inputs it cannot fail.
pub struct ServiceCompiler;

impl ServiceCompiler {
    /// Compile an application into its sub-topology
    ///
    /// # Arguments
    /// * `network` - the network the resources are scoped to
    /// * `cluster` - the shared cluster the service is bound to
    /// * `app` - the normalized application
    pub fn compile(network: &Network, cluster: &Cluster, app: &App) -> ServiceTopology {
        let security_group = SecurityGroup {
            name: derived(&app.name, "sg"),
            vpc: network.vpc.clone(),
            ingress: app_ingress(app.port),
        };

        let load_balancer = LoadBalancer {
            name: derived(&app.name, "elb"),
            scheme: Scheme::InternetFacing,
            subnets: network.public_subnets.clone(),
            security_groups: vec![security_group.name.clone()],
            listeners: vec![Listener {
                protocol: Protocol::Http,
                port: HTTP_PORT,
                instance_port: app.port,
            }],
            health_check: HealthCheck::tcp(app.port),
        };

        let container = ContainerDefinition {
            name: derived(&app.name, "container"),
            image: app.image.clone(),
            memory: app.memory,
            // Host port equals container port; instances serve one task per port
            port_mappings: vec![PortMapping {
                container_port: app.port,
                host_port: app.port,
            }],
            log_configuration: LogConfiguration {
                log_group: app.log_group_name.clone(),
                region: network.region.to_string(),
            },
        };

        let task_definition = TaskDefinition {
            family: derived(&app.name, "task"),
            region: network.region,
            container_definitions: vec![container],
        };

        let role = Role {
            name: derived(&app.name, "service-role"),
            assume_role_policy: ecs_trust_policy(),
            managed_policy_arns: vec![ECS_SERVICE_POLICY_ARN.to_string()],
            inline_policies: vec![InlinePolicy {
                name: derived(&app.name, "describe-instance-health"),
                document: describe_instance_health_policy(),
            }],
        };

        let service = Service {
            name: derived(&app.name, "service"),
            cluster: cluster.name.clone(),
            task_definition: task_definition.family.clone(),
            desired_count: SERVICE_DESIRED_COUNT,
            role: role.name.clone(),
            load_balancers: vec![ServiceLoadBalancer {
                container_name: task_definition.container_definitions[0].name.clone(),
                container_port: app.port,
                load_balancer_name: load_balancer.name.clone(),
            }],
            deployment_configuration: DeploymentConfiguration {
                minimum_healthy_percent: DEPLOYMENT_MIN_HEALTHY_PERCENT,
                maximum_percent: DEPLOYMENT_MAX_PERCENT,
            },
        };

        ServiceTopology {
            security_group,
            load_balancer,
            task_definition,
            role,
            service,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppSpec;
    use crate::region::Region;

    fn test_network() -> Network {
        Network {
            vpc: "vpc-1234".to_string(),
            region: Region::UsEast1,
            public_subnets: vec!["subnet-pub-a".to_string(), "subnet-pub-b".to_string()],
            private_subnets: vec!["subnet-priv-a".to_string()],
        }
    }

    fn test_cluster() -> Cluster {
        Cluster {
            name: "mycluster-cluster".to_string(),
            region: Region::UsEast1,
        }
    }

    fn test_app(name: &str, port: u16) -> App {
        AppSpec {
            name: name.to_string(),
            image: "registry/app:1.0".to_string(),
            log_group_name: "app-logs".to_string(),
            port: Some(port),
            memory: None,
            managed_policies: None,
        }
        .normalize()
    }

    // =========================================================================
    // Story: Security Group Scoped To The Network VPC
    // =========================================================================

    #[test]
    fn story_security_group_has_two_rules_on_the_vpc() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));

        assert_eq!(out.security_group.name, "web-sg");
        assert_eq!(out.security_group.vpc, "vpc-1234");
        assert_eq!(out.security_group.ingress.len(), 2);
        assert_eq!(out.security_group.ingress[1].port, 9000);
    }

    // =========================================================================
    // Story: Load Balancer Fronts The Application Port
    // =========================================================================

    #[test]
    fn story_load_balancer_listens_on_80_and_forwards_to_the_app_port() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let lb = &out.load_balancer;

        assert_eq!(lb.name, "web-elb");
        assert_eq!(lb.scheme, Scheme::InternetFacing);
        assert_eq!(lb.subnets, vec!["subnet-pub-a", "subnet-pub-b"]);
        assert_eq!(lb.security_groups, vec!["web-sg"]);
        assert_eq!(
            lb.listeners,
            vec![Listener {
                protocol: Protocol::Http,
                port: 80,
                instance_port: 9000,
            }]
        );
    }

    #[test]
    fn story_health_check_probes_the_app_port_over_tcp() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let hc = &out.load_balancer.health_check;

        assert_eq!(hc.target.protocol, Protocol::Tcp);
        assert_eq!(hc.target.port, 9000);
        assert_eq!(hc.interval_seconds, 15);
        assert_eq!(hc.timeout_seconds, 3);
        assert_eq!(hc.healthy_threshold, 3);
        assert_eq!(hc.unhealthy_threshold, 3);
    }

    // =========================================================================
    // Story: Task Definition Wraps A Single Container
    // =========================================================================

    #[test]
    fn story_task_definition_wraps_one_container() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let task = &out.task_definition;

        assert_eq!(task.family, "web-task");
        assert_eq!(task.region, Region::UsEast1);
        assert_eq!(task.container_definitions.len(), 1);

        let container = &task.container_definitions[0];
        assert_eq!(container.name, "web-container");
        assert_eq!(container.image, "registry/app:1.0");
        assert_eq!(container.memory, 256);
        assert_eq!(
            container.port_mappings,
            vec![PortMapping {
                container_port: 9000,
                host_port: 9000,
            }]
        );
    }

    #[test]
    fn story_container_logs_go_to_the_declared_group_in_the_network_region() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let logs = &out.task_definition.container_definitions[0].log_configuration;

        assert_eq!(logs.log_group, "app-logs");
        assert_eq!(logs.region, "Us-east-1");
    }

    // =========================================================================
    // Story: Service Role Carries The Fixed Policies
    // =========================================================================

    #[test]
    fn story_service_role_has_trust_managed_and_inline_policies() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let role = &out.role;

        assert_eq!(role.name, "web-service-role");
        assert_eq!(
            role.assume_role_policy["Statement"][0]["Principal"]["Service"],
            "ecs.amazonaws.com"
        );
        assert_eq!(
            role.managed_policy_arns,
            vec![ECS_SERVICE_POLICY_ARN.to_string()]
        );
        assert_eq!(role.inline_policies.len(), 1);
        assert_eq!(role.inline_policies[0].name, "web-describe-instance-health");
    }

    // =========================================================================
    // Story: Service Binds Everything To The Cluster
    // =========================================================================

    #[test]
    fn story_service_binds_task_role_and_load_balancer_to_the_cluster() {
        let out = ServiceCompiler::compile(&test_network(), &test_cluster(), &test_app("web", 9000));
        let service = &out.service;

        assert_eq!(service.name, "web-service");
        assert_eq!(service.cluster, "mycluster-cluster");
        assert_eq!(service.task_definition, "web-task");
        assert_eq!(service.desired_count, 1);
        assert_eq!(service.role, "web-service-role");
        assert_eq!(
            service.load_balancers,
            vec![ServiceLoadBalancer {
                container_name: "web-container".to_string(),
                container_port: 9000,
                load_balancer_name: "web-elb".to_string(),
            }]
        );
        assert_eq!(service.deployment_configuration.minimum_healthy_percent, 60);
        assert_eq!(service.deployment_configuration.maximum_percent, 150);
    }

    // =========================================================================
    // Story: Compilation Is Deterministic
    // =========================================================================

    #[test]
    fn story_compiling_twice_yields_identical_output() {
        let network = test_network();
        let cluster = test_cluster();
        let app = test_app("web", 9000);

        let first = ServiceCompiler::compile(&network, &cluster, &app);
        let second = ServiceCompiler::compile(&network, &cluster, &app);
        assert_eq!(first, second);
    }
}
