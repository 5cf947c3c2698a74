//! Fill a subnet with allocated addresses up to a target utilization.
//!
//! Addresses are handed to the provisioner in batches of one primary plus
//! up to 19 secondaries, the attachment limit of a single interface.

use super::scoring::round2;
use crate::error::{Result, TopologyError};
use crate::models::Ipv4;
use crate::provider::Provisioner;
use itertools::Itertools;
use std::net::Ipv4Addr;

/// Addresses one provisioning call may carry, primary included.
pub const MAX_ADDRESSES_PER_ALLOCATION: usize = 20;

/// Addresses issued in one provisioning call.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationBatch {
    pub primary: Ipv4Addr,
    pub secondaries: Vec<Ipv4Addr>,
}

impl AllocationBatch {
    pub fn size(&self) -> usize {
        1 + self.secondaries.len()
    }
}

/// Where a subnet sits in the refresh, for error context.
#[derive(Debug, Clone, Copy)]
pub struct SubnetLocation<'a> {
    pub network_index: usize,
    pub subnet_index: usize,
    pub subnet_id: &'a str,
}

/// Result of filling one subnet.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub used: u64,
    pub capacity: u64,
    /// `used / capacity` as a percentage, two decimals.
    pub actual_percent: f64,
    pub batches_issued: usize,
}

impl AllocationOutcome {
    fn empty(capacity: u64) -> Self {
        AllocationOutcome {
            used: 0,
            capacity,
            actual_percent: 0.0,
            batches_issued: 0,
        }
    }
}

/// Number of addresses to mark used: `floor(capacity * fraction)`, clamped.
///
/// Targets below one address are zero, never rounded up.
pub fn target_used(capacity: u64, target_fraction: f64) -> u64 {
    let raw = (capacity as f64 * target_fraction).floor();
    if raw > 0.0 {
        (raw as u64).min(capacity)
    } else {
        0
    }
}

/// Split the first `target` usable hosts of `block` into batches.
///
/// Batches follow host order and only the last one may be short. Fewer
/// batches are returned when the block runs out of hosts.
pub fn plan_batches(block: Ipv4, target: u64) -> Vec<AllocationBatch> {
    block
        .usable_hosts()
        .take(target as usize)
        .chunks(MAX_ADDRESSES_PER_ALLOCATION)
        .into_iter()
        .filter_map(|mut chunk| {
            let primary = chunk.next()?;
            Some(AllocationBatch {
                primary,
                secondaries: chunk.collect(),
            })
        })
        .collect()
}

/// Fill `block` to `target_fraction` of its capacity through `provisioner`.
///
/// A failed batch aborts the subnet. Batches already issued stay issued.
pub async fn allocate<P>(
    provisioner: &P,
    location: SubnetLocation<'_>,
    block: Ipv4,
    target_fraction: f64,
) -> Result<AllocationOutcome>
where
    P: Provisioner + ?Sized,
{
    let capacity = block.capacity();
    if capacity == 0 {
        log::debug!("{block} has no usable capacity, nothing to allocate");
        return Ok(AllocationOutcome::empty(0));
    }
    let target = target_used(capacity, target_fraction);
    if target == 0 {
        log::debug!("{block} target {target_fraction} rounds to zero addresses");
        return Ok(AllocationOutcome::empty(capacity));
    }

    let batches = plan_batches(block, target);
    let mut used: u64 = 0;
    for (batch_index, batch) in batches.iter().enumerate() {
        let allocation_id = provisioner
            .create_allocation(location.subnet_id, batch.primary, &batch.secondaries)
            .await
            .map_err(|source| {
                log::warn!(
                    "Allocation batch #{batch_index} for {} ({block}) failed: {source}",
                    location.subnet_id
                );
                TopologyError::Provisioning {
                    network_index: location.network_index,
                    subnet_index: Some(location.subnet_index),
                    batch_index: Some(batch_index),
                    operation: "create_allocation",
                    source,
                }
            })?;
        used += batch.size() as u64;
        log::trace!(
            "{allocation_id}: {} addresses from {} in {}",
            batch.size(),
            batch.primary,
            location.subnet_id
        );
    }

    if used < target {
        log::warn!(
            "{block} ran out of hosts: {used} of {target} addresses allocated",
        );
    }

    let actual_percent = round2(100.0 * used as f64 / capacity as f64);
    log::debug!(
        "{} {block}: {used}/{capacity} used ({actual_percent:.2}%) in {} batches",
        location.subnet_id,
        batches.len()
    );
    Ok(AllocationOutcome {
        used,
        capacity,
        actual_percent,
        batches_issued: batches.len(),
    })
}
