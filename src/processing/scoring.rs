//! Utilization scores, letter grades and the composite health grade.
//!
//! Everything here is a pure function over plain counters; callers fetch
//! the counters from storage themselves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Letter grade for a 0-100 score.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage of `total` in use, rounded to two decimals. `0` for an empty subnet.
pub fn subnet_score(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    round2(100.0 * used as f64 / total as f64)
}

/// Capacity-weighted mean of subnet scores, rounded to two decimals.
///
/// Scores and totals are paired by position.
pub fn network_score(subnet_scores: &[f64], subnet_totals: &[u64]) -> f64 {
    let sum_totals: u64 = subnet_totals.iter().sum();
    if subnet_scores.is_empty() || sum_totals == 0 {
        return 0.0;
    }
    let weighted: f64 = subnet_scores
        .iter()
        .zip(subnet_totals)
        .map(|(score, total)| score * *total as f64)
        .sum();
    round2(weighted / sum_totals as f64)
}

/// Map a score to its letter. Band edges are inclusive below.
pub fn grade(score: f64) -> Grade {
    if score >= 90.0 {
        Grade::APlus
    } else if score >= 80.0 {
        Grade::A
    } else if score >= 70.0 {
        Grade::B
    } else if score >= 60.0 {
        Grade::C
    } else if score >= 50.0 {
        Grade::D
    } else {
        Grade::F
    }
}

pub const MSG_CONSOLIDATE_VPC: &str =
    "Low utilization: consider consolidating workloads or shrinking the VPC address space";
pub const MSG_EXPAND_CAPACITY: &str =
    "High utilization: plan capacity expansion before addresses run out";
pub const MSG_ADD_REDUNDANCY: &str =
    "Single subnet: add subnets in other availability zones for redundancy";
pub const MSG_CONSOLIDATE_SUBNETS: &str =
    "Many subnets: consider consolidating subnets to simplify routing";
pub const MSG_REVIEW_ARCHITECTURE: &str =
    "Subnet layout is inefficient: review the network architecture";
pub const MSG_WELL_CONFIGURED: &str = "VPC is well-configured";

/// Multi-factor grade of one network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompositeResult {
    pub utilization_score: f64,
    pub efficiency_score: f64,
    pub cost_score: f64,
    pub overall_score: f64,
    pub overall_grade: Grade,
    pub recommendations: Vec<String>,
}

/// Structural efficiency: a lone subnet or more than 10 are penalised.
pub fn efficiency_score(subnet_count: usize) -> f64 {
    if subnet_count < 2 {
        50.0
    } else if subnet_count > 10 {
        70.0
    } else {
        100.0
    }
}

/// Cost score rewards busy address space, capped at 100.
pub fn cost_score(network_score: f64) -> f64 {
    (network_score * 1.2).min(100.0)
}

/// Combine utilization, structure and cost into one grade with advice.
pub fn composite_grade(network_score: f64, subnet_count: usize) -> CompositeResult {
    let efficiency = efficiency_score(subnet_count);
    let cost = cost_score(network_score);
    let overall = round2(network_score * 0.5 + efficiency * 0.3 + cost * 0.2);

    let mut recommendations = Vec::new();
    if network_score < 30.0 {
        recommendations.push(MSG_CONSOLIDATE_VPC.to_string());
    }
    if network_score > 90.0 {
        recommendations.push(MSG_EXPAND_CAPACITY.to_string());
    }
    if subnet_count < 2 {
        recommendations.push(MSG_ADD_REDUNDANCY.to_string());
    }
    if subnet_count > 8 {
        recommendations.push(MSG_CONSOLIDATE_SUBNETS.to_string());
    }
    if efficiency < 70.0 {
        recommendations.push(MSG_REVIEW_ARCHITECTURE.to_string());
    }
    if recommendations.is_empty() {
        recommendations.push(MSG_WELL_CONFIGURED.to_string());
    }

    CompositeResult {
        utilization_score: network_score,
        efficiency_score: efficiency,
        cost_score: cost,
        overall_score: overall,
        overall_grade: grade(overall),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_score() {
        assert_eq!(subnet_score(0, 0), 0.0);
        assert_eq!(subnet_score(251, 251), 0.0);
        assert_eq!(subnet_score(251, 0), 100.0);
        assert_eq!(subnet_score(251, 126), 49.8);
        assert_eq!(subnet_score(3, 2), 33.33);
        // More available than total is clamped to zero usage.
        assert_eq!(subnet_score(10, 20), 0.0);
    }

    #[test]
    fn test_network_score_weighted() {
        assert_eq!(network_score(&[], &[]), 0.0);
        assert_eq!(network_score(&[50.0], &[0]), 0.0);
        // Larger subnet dominates.
        assert_eq!(network_score(&[100.0, 0.0], &[300, 100]), 75.0);
    }

    #[test]
    fn test_network_score_equal_totals_is_plain_mean() {
        let scores = [20.0, 40.0, 90.0];
        let totals = [251, 251, 251];
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        assert_eq!(network_score(&scores, &totals), round2(mean));
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade(100.0), Grade::APlus);
        assert_eq!(grade(90.0), Grade::APlus);
        assert_eq!(grade(89.99), Grade::A);
        assert_eq!(grade(80.0), Grade::A);
        assert_eq!(grade(79.99), Grade::B);
        assert_eq!(grade(70.0), Grade::B);
        assert_eq!(grade(69.99), Grade::C);
        assert_eq!(grade(60.0), Grade::C);
        assert_eq!(grade(59.99), Grade::D);
        assert_eq!(grade(50.0), Grade::D);
        assert_eq!(grade(49.99), Grade::F);
        assert_eq!(grade(0.0), Grade::F);
    }

    #[test]
    fn test_grade_monotonic() {
        let mut previous = grade(100.0);
        let mut score = 100.0;
        while score >= 0.0 {
            let current = grade(score);
            // Later variants are worse grades.
            assert!(current >= previous, "grade improved at {score}");
            previous = current;
            score -= 0.25;
        }
        assert_eq!(previous, Grade::F);
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&Grade::C).unwrap(), "\"C\"");
    }

    #[test]
    fn test_composite_well_configured() {
        let result = composite_grade(60.0, 4);
        assert_eq!(result.efficiency_score, 100.0);
        assert_eq!(result.cost_score, 72.0);
        // 30 + 30 + 14.4
        assert_eq!(result.overall_score, 74.4);
        assert_eq!(result.overall_grade, Grade::B);
        assert_eq!(result.recommendations, vec![MSG_WELL_CONFIGURED.to_string()]);
    }

    #[test]
    fn test_composite_independent_rules_both_fire() {
        let result = composite_grade(95.0, 1);
        assert_eq!(result.efficiency_score, 50.0);
        assert_eq!(result.cost_score, 100.0);
        assert_eq!(result.overall_score, 82.5);
        assert_eq!(result.overall_grade, Grade::A);
        assert_eq!(
            result.recommendations,
            vec![
                MSG_EXPAND_CAPACITY.to_string(),
                MSG_ADD_REDUNDANCY.to_string(),
                MSG_REVIEW_ARCHITECTURE.to_string(),
            ]
        );
    }

    #[test]
    fn test_composite_over_segmented_and_idle() {
        let result = composite_grade(10.0, 12);
        assert_eq!(result.efficiency_score, 70.0);
        assert_eq!(result.cost_score, 12.0);
        assert_eq!(result.overall_score, round2(5.0 + 21.0 + 2.4));
        assert_eq!(result.overall_grade, Grade::F);
        assert_eq!(
            result.recommendations,
            vec![
                MSG_CONSOLIDATE_VPC.to_string(),
                MSG_CONSOLIDATE_SUBNETS.to_string(),
            ]
        );
    }

    #[test]
    fn test_composite_nine_subnets_only_consolidation() {
        let result = composite_grade(50.0, 9);
        assert_eq!(result.efficiency_score, 100.0);
        assert_eq!(
            result.recommendations,
            vec![MSG_CONSOLIDATE_SUBNETS.to_string()]
        );
    }
}
