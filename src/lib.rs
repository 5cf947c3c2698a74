//! VPC utilization summary library
//!
//! Generates synthetic VPC and subnet topologies, fills subnets to random
//! utilization targets through a provisioning API and grades the result.
//!
//! # Modules
//! - [`models`] - Core data structures (Ipv4, Network, Subnet, TopologySnapshot)
//! - [`processing`] - Generation, allocation, scoring and refresh logic
//! - [`provider`] - Provisioning and persistence seams with local adapters
//! - [`output`] - Output formatting (CSV, terminal)
//! - [`config`] - Generator configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod provider;

pub use config::GeneratorConfig;
pub use error::{ProviderError, Result, TopologyError};
pub use models::{Ipv4, Network, Subnet, TopologySnapshot};
pub use processing::{composite_grade, grade, grade_vpc, refresh_topology, Grade};
pub use provider::{LocalProvisioner, MemoryStore, Provisioner, TopologyStore};
