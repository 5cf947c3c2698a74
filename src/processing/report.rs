//! Read-side reports over one topology snapshot.
//!
//! Every function takes a single [`TopologySnapshot`], so one report never
//! mixes two generations of data.

use super::scoring::{composite_grade, grade, network_score, CompositeResult, Grade};
use crate::models::{Ipv4, Network, Subnet, TopologySnapshot};
use serde::Serialize;

pub const SERVICE_NAME: &str = "VPC Health and Utilization Metric API";

/// Liveness record for an outer API layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub fn service_info() -> ServiceInfo {
    ServiceInfo {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpcSummary {
    pub network_id: String,
    pub network_name: String,
    pub network_cidr: Ipv4,
    pub subnet_count: usize,
    pub utilization_score: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpcList {
    pub vpcs: Vec<VpcSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpcDetails {
    pub network: Network,
    pub subnets: Vec<Subnet>,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubnetGrade {
    pub subnet_id: String,
    pub subnet_name: String,
    pub subnet_cidr: Ipv4,
    pub used_addresses: u64,
    pub total_addresses: u64,
    pub utilization_score: f64,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub network_id: String,
    pub network_name: String,
    pub utilization_score: f64,
    pub utilization_grade: Grade,
    pub composite: CompositeResult,
    pub subnets: Vec<SubnetGrade>,
}

/// All VPCs with their current grade.
pub fn list_vpcs(snapshot: &TopologySnapshot) -> VpcList {
    let vpcs: Vec<VpcSummary> = snapshot
        .networks
        .iter()
        .map(|network| VpcSummary {
            network_id: network.network_id.clone(),
            network_name: network.network_name.clone(),
            network_cidr: network.network_cidr,
            subnet_count: snapshot.subnets_of(&network.network_id).count(),
            utilization_score: network.utilization_score,
            grade: grade(network.utilization_score),
        })
        .collect();
    VpcList {
        count: vpcs.len(),
        vpcs,
    }
}

/// One VPC with its subnets, or `None` when the id is unknown.
pub fn vpc_details(snapshot: &TopologySnapshot, network_id: &str) -> Option<VpcDetails> {
    let network = snapshot.network(network_id)?;
    Some(VpcDetails {
        network: network.clone(),
        subnets: snapshot.subnets_of(network_id).cloned().collect(),
        grade: grade(network.utilization_score),
    })
}

/// Grade a VPC from its subnets' counters, or `None` when the id is unknown.
///
/// The network score is recomputed here rather than read from the stored
/// record.
pub fn grade_vpc(snapshot: &TopologySnapshot, network_id: &str) -> Option<GradeReport> {
    let network = snapshot.network(network_id)?;
    let subnets: Vec<SubnetGrade> = snapshot
        .subnets_of(network_id)
        .map(|s| {
            let score = super::scoring::subnet_score(s.total_addresses, s.available_addresses);
            SubnetGrade {
                subnet_id: s.subnet_id.clone(),
                subnet_name: s.subnet_name.clone(),
                subnet_cidr: s.subnet_cidr,
                used_addresses: s.used_addresses(),
                total_addresses: s.total_addresses,
                utilization_score: score,
                grade: grade(score),
            }
        })
        .collect();

    let scores: Vec<f64> = subnets.iter().map(|s| s.utilization_score).collect();
    let totals: Vec<u64> = subnets.iter().map(|s| s.total_addresses).collect();
    let utilization_score = network_score(&scores, &totals);
    log::debug!(
        "Grading {network_id}: {} subnets, score {utilization_score:.2}",
        subnets.len()
    );

    Some(GradeReport {
        network_id: network.network_id.clone(),
        network_name: network.network_name.clone(),
        utilization_score,
        utilization_grade: grade(utilization_score),
        composite: composite_grade(utilization_score, subnets.len()),
        subnets,
    })
}
