//! Subnet data model.

use super::{Ipv4, LifecycleState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a subnet inside a VPC with its usage counters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subnet {
    /// Provider id of the subnet.
    pub subnet_id: String,
    /// Id of the parent VPC.
    pub network_id: String,
    /// Name tag.
    pub subnet_name: String,
    /// Availability zone label, e.g. `us-east-1a`.
    pub availability_zone: String,
    /// CIDR block of the subnet, always inside the parent's block.
    pub subnet_cidr: Ipv4,
    pub state: LifecycleState,
    /// Usable host capacity.
    pub total_addresses: u64,
    /// Unused addresses out of `total_addresses`.
    pub available_addresses: u64,
    /// Percentage of capacity in use (0-100).
    pub utilization_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl Subnet {
    /// Addresses marked used.
    pub fn used_addresses(&self) -> u64 {
        self.total_addresses.saturating_sub(self.available_addresses)
    }
}
