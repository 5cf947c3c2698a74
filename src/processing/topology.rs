//! Randomized topology plans.
//!
//! Draws VPC and subnet counts, VPC blocks and per-subnet utilization
//! targets from the configured bounds. Nothing is provisioned here.

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::models::Ipv4;
use rand::Rng;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;

/// First octet of every generated VPC block.
pub const VPC_FIRST_OCTET: u8 = 10;

/// Prefix length of every generated VPC block.
pub const VPC_PREFIX: u8 = 16;

/// Second octets a VPC block may use. `10.0.0.0/16` and `10.255.0.0/16` are
/// left alone.
pub const VPC_SECOND_OCTETS: RangeInclusive<u8> = 1..=254;

/// Region the availability zones belong to.
pub const REGION: &str = "us-east-1";

/// Zone suffixes, assigned round-robin to subnets.
const ZONE_SUFFIXES: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];

/// A subnet to create, with the utilization to fill it to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetPlan {
    pub subnet_name: String,
    pub availability_zone: String,
    pub subnet_cidr: Ipv4,
    /// Target utilization, as a fraction.
    pub target_utilization: f64,
}

/// A VPC to create with its subnets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPlan {
    pub network_name: String,
    pub network_cidr: Ipv4,
    pub subnets: Vec<SubnetPlan>,
}

/// Availability zone label for the `index`-th (0-based) subnet.
pub fn availability_zone(index: usize) -> String {
    format!("{REGION}{}", ZONE_SUFFIXES[index % ZONE_SUFFIXES.len()])
}

/// Generate network plans within `config`'s bounds.
///
/// Bounds are validated before the first draw. VPC blocks may collide
/// across networks; subnets within one network never overlap.
pub fn generate_topology<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Vec<NetworkPlan>> {
    config.validate_ranges()?;

    let vpc_count = rng.gen_range(config.vpc_min..=config.vpc_max);
    log::info!(
        "Generating {vpc_count} VPCs (range {}..={})",
        config.vpc_min,
        config.vpc_max
    );

    let mut plans = Vec::with_capacity(vpc_count as usize);
    for n in 1..=vpc_count {
        let second_octet = rng.gen_range(VPC_SECOND_OCTETS);
        let network_cidr = Ipv4::from_parts(
            Ipv4Addr::new(VPC_FIRST_OCTET, second_octet, 0, 0),
            VPC_PREFIX,
        )?;

        let subnet_count = rng.gen_range(config.subnet_min..=config.subnet_max);
        let mut subnets = Vec::with_capacity(subnet_count as usize);
        for i in 1..=subnet_count {
            let subnet_cidr = network_cidr.child_block(i)?;
            let target_utilization = rng.gen_range(config.util_low..=config.util_high);
            subnets.push(SubnetPlan {
                subnet_name: format!("vpc-{n}-subnet-{i}"),
                availability_zone: availability_zone(i as usize - 1),
                subnet_cidr,
                target_utilization,
            });
        }
        log::debug!(
            "Planned vpc-{n} {network_cidr} with {} subnets",
            subnets.len()
        );

        plans.push(NetworkPlan {
            network_name: format!("vpc-{n}"),
            network_cidr,
            subnets,
        });
    }
    Ok(plans)
}
