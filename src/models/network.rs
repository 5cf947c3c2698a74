//! VPC (network) data model.

use super::{Ipv4, Subnet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning lifecycle of a network or subnet.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Pending,
    Available,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Pending => write!(f, "pending"),
            LifecycleState::Available => write!(f, "available"),
        }
    }
}

/// A VPC with its address block and derived utilization score.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Network {
    /// Provider id of the VPC.
    pub network_id: String,
    /// Name tag.
    pub network_name: String,
    /// Owning account.
    pub owner_id: String,
    /// CIDR block of the VPC.
    pub network_cidr: Ipv4,
    pub state: LifecycleState,
    /// Capacity-weighted utilization of the subnets (0-100).
    pub utilization_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl Network {
    /// Returns true if `subnet` belongs to this network and sits inside its block.
    pub fn owns(&self, subnet: &Subnet) -> bool {
        subnet.network_id == self.network_id && self.network_cidr.contains_block(&subnet.subnet_cidr)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' [{}] ({}, {:.2}%)",
            self.network_id, self.network_name, self.network_cidr, self.state, self.utilization_score
        )
    }
}
