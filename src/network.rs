//! Network reference passed in by the network-provisioning layer
//!
//! The network is an external collaborator entity: this crate never creates
//! or mutates one, it only reads the VPC id, region and subnet lists when
//! wiring the topology.

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// Reference to an already-provisioned network
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// VPC identifier
    pub vpc: String,
    /// Region the network lives in
    pub region: Region,
    /// Public subnet identifiers (load balancers are placed here)
    pub public_subnets: Vec<String>,
    /// Private subnet identifiers (cluster instances are placed here)
    pub private_subnets: Vec<String>,
}
