//! Immutable view of the whole topology.
//!
//! Readers hold an `Arc<TopologySnapshot>` so that every query they run sees
//! the same generation of networks and subnets.

use super::{Network, Subnet};
use crate::error::{ProviderError, Result, TopologyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopologySnapshot {
    /// Monotonic generation number, bumped on every swap.
    pub generation: u64,
    pub created_at: DateTime<Utc>,
    /// Networks in creation order.
    pub networks: Vec<Network>,
    /// Subnets in creation order.
    pub subnets: Vec<Subnet>,
}

impl Default for TopologySnapshot {
    fn default() -> Self {
        TopologySnapshot {
            generation: 0,
            created_at: Utc::now(),
            networks: vec![],
            subnets: vec![],
        }
    }
}

impl TopologySnapshot {
    pub fn new(networks: Vec<Network>, subnets: Vec<Subnet>) -> Self {
        TopologySnapshot {
            generation: 0,
            created_at: Utc::now(),
            networks,
            subnets,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn network(&self, network_id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.network_id == network_id)
    }

    pub fn subnets_of<'a>(&'a self, network_id: &'a str) -> impl Iterator<Item = &'a Subnet> + 'a {
        self.subnets
            .iter()
            .filter(move |s| s.network_id == network_id)
    }

    /// Insert or replace a network keyed by its id.
    pub fn upsert_network(&mut self, network: Network) {
        match self
            .networks
            .iter_mut()
            .find(|n| n.network_id == network.network_id)
        {
            Some(existing) => *existing = network,
            None => self.networks.push(network),
        }
    }

    /// Insert or replace a subnet keyed by its id. The parent must exist.
    pub fn upsert_subnet(&mut self, subnet: Subnet) -> Result<()> {
        let parent = self
            .network(&subnet.network_id)
            .ok_or_else(|| missing_parent(&subnet))?;
        if !parent.network_cidr.contains_block(&subnet.subnet_cidr) {
            return Err(TopologyError::address_range(
                subnet.subnet_cidr,
                format!("not inside parent block {}", parent.network_cidr),
            ));
        }
        match self
            .subnets
            .iter_mut()
            .find(|s| s.subnet_id == subnet.subnet_id)
        {
            Some(existing) => *existing = subnet,
            None => self.subnets.push(subnet),
        }
        Ok(())
    }

    /// Check that every subnet has a parent whose block contains it.
    ///
    /// A missing parent is a `Persistence` error, a parent whose block does
    /// not contain the subnet is an `InvalidAddressRange` error.
    pub fn validate(&self) -> Result<()> {
        for subnet in &self.subnets {
            match self.network(&subnet.network_id) {
                Some(parent) if parent.owns(subnet) => {}
                Some(parent) => {
                    return Err(TopologyError::address_range(
                        subnet.subnet_cidr,
                        format!("not inside parent block {}", parent.network_cidr),
                    ))
                }
                None => return Err(missing_parent(subnet)),
            }
        }
        Ok(())
    }
}

fn missing_parent(subnet: &Subnet) -> TopologyError {
    TopologyError::Persistence(ProviderError::new(format!(
        "parent network {} not found for subnet {}",
        subnet.network_id, subnet.subnet_id
    )))
}

impl fmt::Display for TopologySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Topology gen {} ({} VPCs, {} subnets):",
            self.generation,
            self.networks.len(),
            self.subnets.len()
        )?;
        for network in &self.networks {
            writeln!(f, "  - {network}")?;
        }
        Ok(())
    }
}
