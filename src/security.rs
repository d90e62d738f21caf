//! Security group types and ingress rule composition
//!
//! Two rule sets are derived from the declared application ports:
//!
//! - **Cluster-level**: the HTTP base rule followed by one TCP rule per
//!   application port. Composition is plain concatenation - two applications
//!   sharing a port produce two structurally distinct rules.
//! - **Per-application**: exactly two rules, HTTP on 80 and TCP on the
//!   application's own port.

use serde::{Deserialize, Serialize};

/// Source CIDR matching any address
pub const ANYWHERE: &str = "0.0.0.0/0";

/// Port the HTTP base rule and load balancer listeners are open on
pub const HTTP_PORT: u16 = 80;

/// Wire protocol for an ingress rule or listener
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// HTTP
    Http,
    /// Raw TCP
    Tcp,
}

/// One ingress rule in a security group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    /// Protocol the rule matches
    pub protocol: Protocol,
    /// Port the rule opens
    pub port: u16,
    /// Source CIDR the rule admits
    pub source: String,
}

impl IngressRule {
    /// The base rule: HTTP on 80, open to all
    pub fn http() -> Self {
        Self {
            protocol: Protocol::Http,
            port: HTTP_PORT,
            source: ANYWHERE.to_string(),
        }
    }

    /// A TCP rule on the given port, open to all
    pub fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            port,
            source: ANYWHERE.to_string(),
        }
    }
}

/// Declarative security group scoped to a VPC
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    /// Security group name
    pub name: String,
    /// VPC the group is scoped to
    pub vpc: String,
    /// Ingress rules, in composition order
    pub ingress: Vec<IngressRule>,
}

/// Compose the cluster-level ingress rule set from all application ports
///
/// The base HTTP rule comes first, then one TCP rule per port in
/// application order. Duplicate ports are preserved, not deduplicated.
pub fn cluster_ingress(ports: impl IntoIterator<Item = u16>) -> Vec<IngressRule> {
    std::iter::once(IngressRule::http())
        .chain(ports.into_iter().map(IngressRule::tcp))
        .collect()
}

/// Compose the per-application ingress rule set
///
/// Always exactly two rules: HTTP on 80 and TCP on the application's port.
pub fn app_ingress(port: u16) -> Vec<IngressRule> {
    vec![IngressRule::http(), IngressRule::tcp(port)]
}
