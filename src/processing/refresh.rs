//! End-to-end topology refresh.
//!
//! Generates plans, provisions networks and subnets, fills subnets to their
//! targets, scores everything and publishes the result as one snapshot.
//! Nothing is published until every network succeeded, so an error or a
//! dropped future leaves the previous snapshot in place.

use super::allocator::{allocate, SubnetLocation};
use super::scoring::{network_score, subnet_score};
use super::topology::{generate_topology, NetworkPlan, SubnetPlan};
use crate::config::GeneratorConfig;
use crate::error::{ProviderError, Result, TopologyError};
use crate::models::{LifecycleState, Network, Subnet, TopologySnapshot};
use crate::provider::{Provisioner, TopologyStore};
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use rand::Rng;
use serde::Serialize;

/// Summary of one refresh run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub networks: usize,
    pub subnets: usize,
    pub allocation_calls: usize,
    pub addresses_used: u64,
}

/// Recompute every subnet score from its counters, then every network score.
pub fn apply_scores(snapshot: &mut TopologySnapshot) {
    let now = Utc::now();
    for subnet in snapshot.subnets.iter_mut() {
        subnet.utilization_score = subnet_score(subnet.total_addresses, subnet.available_addresses);
        subnet.last_updated = now;
    }
    for network in snapshot.networks.iter_mut() {
        let (scores, totals): (Vec<f64>, Vec<u64>) = snapshot
            .subnets
            .iter()
            .filter(|s| s.network_id == network.network_id)
            .map(|s| (s.utilization_score, s.total_addresses))
            .unzip();
        network.utilization_score = network_score(&scores, &totals);
        network.last_updated = now;
    }
}

/// Rebuild the whole topology and publish it to `store`.
pub async fn refresh_topology<R, P, S>(
    config: &GeneratorConfig,
    rng: &mut R,
    provisioner: &P,
    store: &S,
) -> Result<RefreshReport>
where
    R: Rng,
    P: Provisioner + ?Sized,
    S: TopologyStore + ?Sized,
{
    let plans = generate_topology(config, rng)?;
    log::info!("#Start refresh_topology() with {} VPC plans", plans.len());

    let mut report = RefreshReport::default();
    let mut networks = Vec::with_capacity(plans.len());
    let mut subnets = Vec::new();
    for (network_index, plan) in plans.iter().enumerate() {
        let (network, network_subnets, calls) =
            provision_network(config, provisioner, network_index, plan)
                .await
                .map_err(|e| {
                    log::error!("Refresh aborted at {}: {e}", plan.network_name);
                    e
                })?;
        report.networks += 1;
        report.subnets += network_subnets.len();
        report.allocation_calls += calls;
        report.addresses_used += network_subnets
            .iter()
            .map(Subnet::used_addresses)
            .sum::<u64>();
        networks.push(network);
        subnets.extend(network_subnets);
    }

    let mut snapshot = TopologySnapshot::new(networks, subnets);
    apply_scores(&mut snapshot);
    store
        .swap_in(snapshot)
        .await
        .map_err(TopologyError::Persistence)?;

    log::info!(
        "# End refresh_topology(): {} VPCs, {} subnets, {} allocation calls",
        report.networks,
        report.subnets,
        report.allocation_calls
    );
    Ok(report)
}

async fn provision_network<P>(
    config: &GeneratorConfig,
    provisioner: &P,
    network_index: usize,
    plan: &NetworkPlan,
) -> Result<(Network, Vec<Subnet>, usize)>
where
    P: Provisioner + ?Sized,
{
    let failed = |operation: &'static str| {
        move |source: ProviderError| TopologyError::Provisioning {
            network_index,
            subnet_index: None,
            batch_index: None,
            operation,
            source,
        }
    };

    let network_id = provisioner
        .create_network(plan.network_cidr)
        .await
        .map_err(failed("create_network"))?;
    provisioner
        .tag(&network_id, &plan.network_name)
        .await
        .map_err(failed("tag"))?;
    log::debug!(
        "Created {network_id} '{}' {}",
        plan.network_name,
        plan.network_cidr
    );

    let results: Vec<(Subnet, usize)> = stream::iter(plan.subnets.iter().enumerate())
        .map(|(subnet_index, subnet_plan)| {
            provision_subnet(provisioner, network_index, subnet_index, &network_id, subnet_plan)
        })
        .buffered(config.max_concurrent_subnets.max(1))
        .try_collect()
        .await?;

    let calls: usize = results.iter().map(|(_, calls)| calls).sum();
    let subnets: Vec<Subnet> = results.into_iter().map(|(subnet, _)| subnet).collect();
    let network = Network {
        network_id,
        network_name: plan.network_name.clone(),
        owner_id: provisioner.owner_id(),
        network_cidr: plan.network_cidr,
        state: LifecycleState::Available,
        utilization_score: 0.0,
        last_updated: Utc::now(),
    };
    Ok((network, subnets, calls))
}

async fn provision_subnet<P>(
    provisioner: &P,
    network_index: usize,
    subnet_index: usize,
    network_id: &str,
    plan: &SubnetPlan,
) -> Result<(Subnet, usize)>
where
    P: Provisioner + ?Sized,
{
    let failed = |operation: &'static str| {
        move |source: ProviderError| TopologyError::Provisioning {
            network_index,
            subnet_index: Some(subnet_index),
            batch_index: None,
            operation,
            source,
        }
    };

    let subnet_id = provisioner
        .create_subnet(network_id, plan.subnet_cidr)
        .await
        .map_err(failed("create_subnet"))?;
    provisioner
        .tag(&subnet_id, &plan.subnet_name)
        .await
        .map_err(failed("tag"))?;

    let location = SubnetLocation {
        network_index,
        subnet_index,
        subnet_id: &subnet_id,
    };
    let outcome = allocate(provisioner, location, plan.subnet_cidr, plan.target_utilization).await?;

    let subnet = Subnet {
        subnet_id: subnet_id.clone(),
        network_id: network_id.to_string(),
        subnet_name: plan.subnet_name.clone(),
        availability_zone: plan.availability_zone.clone(),
        subnet_cidr: plan.subnet_cidr,
        state: LifecycleState::Available,
        total_addresses: outcome.capacity,
        available_addresses: outcome.capacity - outcome.used,
        utilization_score: outcome.actual_percent,
        last_updated: Utc::now(),
    };
    Ok((subnet, outcome.batches_issued))
}
