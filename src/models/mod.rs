//! Domain models for VPC utilization summaries.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] - IPv4 address block with CIDR arithmetic
//! - [`Network`] - VPC representation with its utilization score
//! - [`Subnet`] - Subnet representation with usage counters
//! - [`TopologySnapshot`] - Immutable view of all networks and subnets

mod ipv4;
mod network;
mod snapshot;
mod subnet;

// Re-export public types
pub use ipv4::{
    cut_addr, get_cidr_mask, Ipv4, UsableHosts, CHILD_PREFIX_STEP, MAX_LENGTH,
    RESERVED_ADDRESSES,
};
pub use network::{LifecycleState, Network};
pub use snapshot::TopologySnapshot;
pub use subnet::Subnet;
