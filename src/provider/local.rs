//! In-memory provisioner standing in for a local cloud emulator.
//!
//! Hands out sequential resource ids and enforces the same rules a real
//! provider would: subnets inside their VPC, allocations inside their subnet,
//! no address handed out twice, and at most [`MAX_ADDRESSES_PER_ALLOCATION`]
//! addresses per call.

use super::{ProviderResult, Provisioner};
use crate::error::ProviderError;
use crate::models::Ipv4;
use crate::processing::MAX_ADDRESSES_PER_ALLOCATION;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Account id the local emulator reports for every resource.
pub const LOCAL_OWNER_ID: &str = "000000000000";

/// One recorded `create_allocation` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRecord {
    pub allocation_id: String,
    pub subnet_id: String,
    pub primary: Ipv4Addr,
    pub secondaries: Vec<Ipv4Addr>,
}

impl AllocationRecord {
    /// Addresses covered by this call, primary included.
    pub fn address_count(&self) -> usize {
        1 + self.secondaries.len()
    }
}

#[derive(Debug, Default)]
struct LocalState {
    next_id: u64,
    networks: HashMap<String, Ipv4>,
    /// subnet id -> (network id, block)
    subnets: HashMap<String, (String, Ipv4)>,
    used: HashMap<String, HashSet<Ipv4Addr>>,
    tags: HashMap<String, String>,
    allocations: Vec<AllocationRecord>,
}

impl LocalState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:08x}", self.next_id)
    }
}

/// Local provisioner with optional failure and latency injection.
#[derive(Debug, Default)]
pub struct LocalProvisioner {
    state: Mutex<LocalState>,
    fail_allocation_at: Option<usize>,
    delay: Option<Duration>,
}

impl LocalProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `call_index`-th (0-based) allocation call.
    pub fn with_allocation_failure(mut self, call_index: usize) -> Self {
        self.fail_allocation_at = Some(call_index);
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every successful allocation call, in issue order.
    pub fn allocations(&self) -> Vec<AllocationRecord> {
        self.state.lock().allocations.clone()
    }

    /// Allocation calls made for one subnet.
    pub fn allocations_for(&self, subnet_id: &str) -> Vec<AllocationRecord> {
        self.state
            .lock()
            .allocations
            .iter()
            .filter(|a| a.subnet_id == subnet_id)
            .cloned()
            .collect()
    }

    pub fn tag_of(&self, resource_id: &str) -> Option<String> {
        self.state.lock().tags.get(resource_id).cloned()
    }

    pub fn network_count(&self) -> usize {
        self.state.lock().networks.len()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Provisioner for LocalProvisioner {
    async fn create_network(&self, block: Ipv4) -> ProviderResult<String> {
        self.pause().await;
        let mut state = self.state.lock();
        let id = state.next_id("vpc");
        state.networks.insert(id.clone(), block);
        log::trace!("local: created {id} for {block}");
        Ok(id)
    }

    async fn create_subnet(&self, network_id: &str, block: Ipv4) -> ProviderResult<String> {
        self.pause().await;
        let mut state = self.state.lock();
        let parent = *state
            .networks
            .get(network_id)
            .ok_or_else(|| ProviderError::new(format!("InvalidVpcID.NotFound: {network_id}")))?;
        if !parent.contains_block(&block) {
            return Err(ProviderError::new(format!(
                "InvalidSubnet.Range: {block} is not inside {parent}"
            )));
        }
        if state
            .subnets
            .values()
            .filter(|(owner, _)| owner == network_id)
            .any(|(_, s)| s.contains(block.lo()) || block.contains(s.lo()))
        {
            return Err(ProviderError::new(format!(
                "InvalidSubnet.Conflict: {block} overlaps an existing subnet"
            )));
        }
        let id = state.next_id("subnet");
        state
            .subnets
            .insert(id.clone(), (network_id.to_string(), block));
        log::trace!("local: created {id} for {block} in {network_id}");
        Ok(id)
    }

    async fn create_allocation(
        &self,
        subnet_id: &str,
        primary: Ipv4Addr,
        secondaries: &[Ipv4Addr],
    ) -> ProviderResult<String> {
        self.pause().await;
        let mut state = self.state.lock();
        if Some(state.allocations.len()) == self.fail_allocation_at {
            return Err(ProviderError::new(format!(
                "InternalError: injected failure on allocation #{}",
                state.allocations.len()
            )));
        }
        let block = state
            .subnets
            .get(subnet_id)
            .map(|(_, block)| *block)
            .ok_or_else(|| ProviderError::new(format!("InvalidSubnetID.NotFound: {subnet_id}")))?;
        if 1 + secondaries.len() > MAX_ADDRESSES_PER_ALLOCATION {
            return Err(ProviderError::new(format!(
                "PrivateIpAddressLimitExceeded: {} addresses requested",
                1 + secondaries.len()
            )));
        }

        let used = state.used.entry(subnet_id.to_string()).or_default();
        for addr in std::iter::once(&primary).chain(secondaries) {
            if !block.contains(*addr) {
                return Err(ProviderError::new(format!(
                    "InvalidParameterValue: {addr} is not in {block}"
                )));
            }
            if used.contains(addr) {
                return Err(ProviderError::new(format!(
                    "InvalidIPAddress.InUse: {addr}"
                )));
            }
        }
        used.insert(primary);
        used.extend(secondaries.iter().copied());

        let allocation_id = state.next_id("eni");
        state.allocations.push(AllocationRecord {
            allocation_id: allocation_id.clone(),
            subnet_id: subnet_id.to_string(),
            primary,
            secondaries: secondaries.to_vec(),
        });
        Ok(allocation_id)
    }

    async fn tag(&self, resource_id: &str, name: &str) -> ProviderResult<()> {
        self.pause().await;
        let mut state = self.state.lock();
        if !state.networks.contains_key(resource_id) && !state.subnets.contains_key(resource_id) {
            return Err(ProviderError::new(format!(
                "InvalidID.NotFound: {resource_id}"
            )));
        }
        state.tags.insert(resource_id.to_string(), name.to_string());
        Ok(())
    }

    fn owner_id(&self) -> String {
        LOCAL_OWNER_ID.to_string()
    }
}
