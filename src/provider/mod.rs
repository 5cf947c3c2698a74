//! External collaborators: cloud provisioning and persistence.
//!
//! This module defines the seams the core talks through:
//! - [`Provisioner`] - creates networks, subnets and address allocations
//! - [`TopologyStore`] - stores networks and subnets, swaps whole snapshots
//!
//! Local in-memory adapters are provided for development and tests:
//! - [`local`] - [`LocalProvisioner`], a stand-in for a local cloud emulator
//! - [`memory`] - [`MemoryStore`], copy-and-swap snapshot storage

mod local;
mod memory;

use crate::error::ProviderError;
use crate::models::{Ipv4, Network, Subnet, TopologySnapshot};
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub use local::{AllocationRecord, LocalProvisioner};
pub use memory::MemoryStore;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cloud provisioning API. Retries and timeouts are the implementor's concern.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create a VPC for `block`, returning its id.
    async fn create_network(&self, block: Ipv4) -> ProviderResult<String>;

    /// Create a subnet for `block` inside `network_id`, returning its id.
    async fn create_subnet(&self, network_id: &str, block: Ipv4) -> ProviderResult<String>;

    /// Attach a primary address plus secondaries in `subnet_id`, returning the allocation id.
    async fn create_allocation(
        &self,
        subnet_id: &str,
        primary: Ipv4Addr,
        secondaries: &[Ipv4Addr],
    ) -> ProviderResult<String>;

    /// Set the name tag of a resource.
    async fn tag(&self, resource_id: &str, name: &str) -> ProviderResult<()>;

    /// Account that owns created resources.
    fn owner_id(&self) -> String;
}

/// Persistence API for networks and subnets.
#[async_trait]
pub trait TopologyStore: Send + Sync {
    async fn upsert_network(&self, network: Network) -> ProviderResult<()>;

    async fn upsert_subnet(&self, subnet: Subnet) -> ProviderResult<()>;

    async fn clear_all(&self) -> ProviderResult<()>;

    async fn query_network(&self, network_id: &str) -> ProviderResult<Option<Network>>;

    async fn query_subnets_of(&self, network_id: &str) -> ProviderResult<Vec<Subnet>>;

    async fn query_networks(&self) -> ProviderResult<Vec<Network>>;

    /// One consistent view of everything stored.
    async fn snapshot(&self) -> ProviderResult<Arc<TopologySnapshot>>;

    /// Atomically replace everything stored with `snapshot`.
    async fn swap_in(&self, snapshot: TopologySnapshot) -> ProviderResult<()>;
}
