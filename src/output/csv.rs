//! CSV-style summary of a topology snapshot.

use super::terminal::{format_field, grade_colored};
use crate::models::{Network, Subnet, TopologySnapshot};
use crate::processing::grade;

const HEADER: &str = r#" "kind",       "id",                 "name",         "cidr",   "az",   "used/total",  "score", "grade""#;

/// Render the snapshot as CSV lines: a header, then each VPC followed by its subnets.
pub fn snapshot_rows(snapshot: &TopologySnapshot) -> Vec<String> {
    let mut rows = vec![HEADER.to_string()];
    for network in &snapshot.networks {
        rows.push(network_row(network));
        for subnet in snapshot.subnets_of(&network.network_id) {
            rows.push(subnet_row(subnet));
        }
    }
    rows
}

/// Print the snapshot summary to stdout.
pub fn snapshot_print(snapshot: &TopologySnapshot) {
    log::info!(
        "#Start snapshot_print() gen {} with {} VPCs",
        snapshot.generation,
        snapshot.networks.len()
    );
    for row in snapshot_rows(snapshot) {
        println!("{row}");
    }
}

fn network_row(network: &Network) -> String {
    let grade = grade(network.utilization_score);
    format!(
        "{kind},{id},{name},{cidr},{az},{used},{score},{grade}",
        kind = format_field("vpc", 7),
        id = format_field(&network.network_id, 21),
        name = format_field(&network.network_name, 16),
        cidr = format_field(network.network_cidr, 15),
        az = format_field("-", 12),
        used = format_field("-", 12),
        score = format_field(format!("{:.2}", network.utilization_score), 8),
        grade = grade_colored(grade, &format_field(grade, 5)),
    )
}

fn subnet_row(subnet: &Subnet) -> String {
    let grade = grade(subnet.utilization_score);
    format!(
        "{kind},{id},{name},{cidr},{az},{used},{score},{grade}",
        kind = format_field("subnet", 7),
        id = format_field(&subnet.subnet_id, 21),
        name = format_field(&subnet.subnet_name, 16),
        cidr = format_field(subnet.subnet_cidr, 15),
        az = format_field(&subnet.availability_zone, 12),
        used = format_field(
            format!("{}/{}", subnet.used_addresses(), subnet.total_addresses),
            12
        ),
        score = format_field(format!("{:.2}", subnet.utilization_score), 8),
        grade = grade_colored(grade, &format_field(grade, 5)),
    )
}
