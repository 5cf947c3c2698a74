//! Topology generation, allocation and grading logic.
//!
//! This module contains the business logic of the crate:
//! - [`topology`] - Randomized VPC and subnet plans
//! - [`allocator`] - Filling subnets to a target utilization in batches
//! - [`scoring`] - Utilization scores, letter grades and composite grades
//! - [`refresh`] - End-to-end refresh publishing one snapshot
//! - [`report`] - Read-side reports over a snapshot

pub mod allocator;
pub mod refresh;
pub mod report;
pub mod scoring;
pub mod topology;

// Re-export public functions
pub use allocator::{
    allocate, plan_batches, target_used, AllocationBatch, AllocationOutcome, SubnetLocation,
    MAX_ADDRESSES_PER_ALLOCATION,
};
pub use refresh::{apply_scores, refresh_topology, RefreshReport};
pub use report::{
    grade_vpc, list_vpcs, service_info, vpc_details, GradeReport, ServiceInfo, SubnetGrade,
    VpcDetails, VpcList, VpcSummary,
};
pub use scoring::{
    composite_grade, grade, network_score, subnet_score, CompositeResult, Grade,
};
pub use topology::{generate_topology, NetworkPlan, SubnetPlan};
