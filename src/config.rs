//! Generator configuration loaded from the environment.
//!
//! Values come from process environment variables (a `.env` file is loaded
//! first by the binary). Unset variables fall back to the defaults below.

use crate::error::{Result, TopologyError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const ENV_VPC_MIN: &str = "VPC_MIN";
pub const ENV_VPC_MAX: &str = "VPC_MAX";
pub const ENV_SUBNET_MIN: &str = "SUBNET_MIN";
pub const ENV_SUBNET_MAX: &str = "SUBNET_MAX";
pub const ENV_UTIL_LOW: &str = "UTIL_LOW";
pub const ENV_UTIL_HIGH: &str = "UTIL_HIGH";
pub const ENV_SEED: &str = "TOPOLOGY_SEED";
pub const ENV_MAX_CONCURRENT_SUBNETS: &str = "MAX_CONCURRENT_SUBNETS";

/// Bounds for topology generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub vpc_min: u32,
    pub vpc_max: u32,
    pub subnet_min: u32,
    pub subnet_max: u32,
    /// Lowest target utilization, as a fraction.
    pub util_low: f64,
    /// Highest target utilization, as a fraction.
    pub util_high: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
    /// Subnets allocated concurrently inside one network (1 = sequential).
    pub max_concurrent_subnets: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            vpc_min: 2,
            vpc_max: 5,
            subnet_min: 2,
            subnet_max: 6,
            util_low: 0.1,
            util_high: 0.95,
            seed: None,
            max_concurrent_subnets: 1,
        }
    }
}

impl GeneratorConfig {
    /// Read the configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (environment, map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GeneratorConfig::default();
        let config = GeneratorConfig {
            vpc_min: parse_var(&lookup, ENV_VPC_MIN)?.unwrap_or(defaults.vpc_min),
            vpc_max: parse_var(&lookup, ENV_VPC_MAX)?.unwrap_or(defaults.vpc_max),
            subnet_min: parse_var(&lookup, ENV_SUBNET_MIN)?.unwrap_or(defaults.subnet_min),
            subnet_max: parse_var(&lookup, ENV_SUBNET_MAX)?.unwrap_or(defaults.subnet_max),
            util_low: parse_var(&lookup, ENV_UTIL_LOW)?.unwrap_or(defaults.util_low),
            util_high: parse_var(&lookup, ENV_UTIL_HIGH)?.unwrap_or(defaults.util_high),
            seed: parse_var(&lookup, ENV_SEED)?,
            max_concurrent_subnets: parse_var(&lookup, ENV_MAX_CONCURRENT_SUBNETS)?
                .unwrap_or(defaults.max_concurrent_subnets),
        };
        config.validate_ranges()?;
        log::debug!("Loaded generator config: {:?}", config);
        Ok(config)
    }

    /// Reject bounds that cannot describe a topology.
    ///
    /// Every minimum must be positive and every maximum at least its
    /// minimum. Utilization is a fraction, so the high bound may not
    /// exceed 1.0.
    pub fn validate_ranges(&self) -> Result<()> {
        if self.vpc_min == 0 {
            return Err(TopologyError::configuration(ENV_VPC_MIN, "must be > 0"));
        }
        if self.vpc_max < self.vpc_min {
            return Err(TopologyError::configuration(
                ENV_VPC_MAX,
                format!("{} is below {ENV_VPC_MIN} {}", self.vpc_max, self.vpc_min),
            ));
        }
        if self.subnet_min == 0 {
            return Err(TopologyError::configuration(ENV_SUBNET_MIN, "must be > 0"));
        }
        if self.subnet_max < self.subnet_min {
            return Err(TopologyError::configuration(
                ENV_SUBNET_MAX,
                format!(
                    "{} is below {ENV_SUBNET_MIN} {}",
                    self.subnet_max, self.subnet_min
                ),
            ));
        }
        if !(self.util_low > 0.0) {
            return Err(TopologyError::configuration(
                ENV_UTIL_LOW,
                format!("{} must be > 0", self.util_low),
            ));
        }
        if !(self.util_high >= self.util_low) {
            return Err(TopologyError::configuration(
                ENV_UTIL_HIGH,
                format!("{} is below {ENV_UTIL_LOW} {}", self.util_high, self.util_low),
            ));
        }
        if self.util_high > 1.0 {
            return Err(TopologyError::configuration(
                ENV_UTIL_HIGH,
                format!("{} is above 1.0", self.util_high),
            ));
        }
        if self.max_concurrent_subnets == 0 {
            return Err(TopologyError::configuration(
                ENV_MAX_CONCURRENT_SUBNETS,
                "must be > 0",
            ));
        }
        Ok(())
    }

    /// Random source for the generator: seeded when a seed is configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TopologyError::configuration(key, format!("cannot parse '{raw}': {e}"))),
    }
}
