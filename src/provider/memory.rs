//! Copy-and-swap snapshot storage.
//!
//! Readers clone the current `Arc<TopologySnapshot>` and never block a
//! writer for longer than a pointer swap. Writers build a new snapshot off
//! to the side and publish it in one step, so a reader sees either the old
//! topology or the new one, never a mix.

use super::{ProviderResult, TopologyStore};
use crate::error::{ProviderError, TopologyError};
use crate::models::{Network, Subnet, TopologySnapshot};
use crate::processing::apply_scores;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemoryStore {
    current: RwLock<Arc<TopologySnapshot>>,
    /// Serialises writers so read-modify-swap updates don't lose each other.
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Arc<TopologySnapshot> {
        self.current.read().clone()
    }

    fn publish(&self, mut next: TopologySnapshot) {
        let mut current = self.current.write();
        next.generation = current.generation + 1;
        log::info!(
            "Publishing topology gen {} ({} VPCs, {} subnets)",
            next.generation,
            next.networks.len(),
            next.subnets.len()
        );
        *current = Arc::new(next);
    }

    /// Apply `change` to a private copy of the current snapshot and publish it.
    ///
    /// Stored scores are always rederived from the usage counters.
    fn update<F>(&self, change: F) -> ProviderResult<()>
    where
        F: FnOnce(&mut TopologySnapshot) -> ProviderResult<()>,
    {
        let _writer = self.write_lock.lock();
        let mut next = (*self.current()).clone();
        change(&mut next)?;
        apply_scores(&mut next);
        self.publish(next);
        Ok(())
    }
}

#[async_trait]
impl TopologyStore for MemoryStore {
    async fn upsert_network(&self, network: Network) -> ProviderResult<()> {
        self.update(|snap| {
            snap.upsert_network(network);
            Ok(())
        })
    }

    async fn upsert_subnet(&self, subnet: Subnet) -> ProviderResult<()> {
        self.update(|snap| {
            snap.upsert_subnet(subnet).map_err(|e| match e {
                TopologyError::Persistence(source) => source,
                other => ProviderError::new(other.to_string()),
            })
        })
    }

    async fn clear_all(&self) -> ProviderResult<()> {
        self.update(|snap| {
            snap.networks.clear();
            snap.subnets.clear();
            Ok(())
        })
    }

    async fn query_network(&self, network_id: &str) -> ProviderResult<Option<Network>> {
        Ok(self.current().network(network_id).cloned())
    }

    async fn query_subnets_of(&self, network_id: &str) -> ProviderResult<Vec<Subnet>> {
        Ok(self.current().subnets_of(network_id).cloned().collect())
    }

    async fn query_networks(&self) -> ProviderResult<Vec<Network>> {
        Ok(self.current().networks.clone())
    }

    async fn snapshot(&self) -> ProviderResult<Arc<TopologySnapshot>> {
        Ok(self.current())
    }

    async fn swap_in(&self, mut snapshot: TopologySnapshot) -> ProviderResult<()> {
        snapshot
            .validate()
            .map_err(|e| ProviderError::new(format!("rejected snapshot: {e}")))?;
        apply_scores(&mut snapshot);
        let _writer = self.write_lock.lock();
        self.publish(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ipv4, LifecycleState};
    use crate::processing::{grade_vpc, list_vpcs, vpc_details};
    use chrono::Utc;

    fn network(id: &str, cidr: &str) -> Network {
        Network {
            network_id: id.to_string(),
            network_name: id.to_string(),
            owner_id: "000000000000".to_string(),
            network_cidr: Ipv4::new(cidr).unwrap(),
            state: LifecycleState::Available,
            utilization_score: 10.0,
            last_updated: Utc::now(),
        }
    }

    fn subnet(id: &str, network_id: &str, cidr: &str) -> Subnet {
        let cidr = Ipv4::new(cidr).unwrap();
        Subnet {
            subnet_id: id.to_string(),
            network_id: network_id.to_string(),
            subnet_name: id.to_string(),
            availability_zone: "us-east-1b".to_string(),
            subnet_cidr: cidr,
            state: LifecycleState::Available,
            total_addresses: cidr.capacity(),
            available_addresses: 100,
            utilization_score: 60.16,
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let store = MemoryStore::new();
        store.upsert_network(network("vpc-1", "10.1.0.0/16")).await.unwrap();
        store
            .upsert_subnet(subnet("subnet-1", "vpc-1", "10.1.1.0/24"))
            .await
            .unwrap();
        assert!(store
            .upsert_subnet(subnet("subnet-2", "vpc-404", "10.1.2.0/24"))
            .await
            .is_err());

        let found = store.query_network("vpc-1").await.unwrap().unwrap();
        assert_eq!(found.network_cidr, Ipv4::new("10.1.0.0/16").unwrap());
        assert!(store.query_network("vpc-2").await.unwrap().is_none());
        assert_eq!(store.query_subnets_of("vpc-1").await.unwrap().len(), 1);
        assert_eq!(store.query_networks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryStore::new();
        store.upsert_network(network("vpc-1", "10.1.0.0/16")).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.query_networks().await.unwrap().is_empty());
        assert!(store.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_swap_keeps_old_snapshot_alive_for_readers() {
        let store = MemoryStore::new();
        store
            .swap_in(TopologySnapshot::new(
                vec![network("vpc-old", "10.1.0.0/16")],
                vec![subnet("subnet-old", "vpc-old", "10.1.1.0/24")],
            ))
            .await
            .unwrap();
        let held = store.snapshot().await.unwrap();

        store
            .swap_in(TopologySnapshot::new(
                vec![network("vpc-new", "10.2.0.0/16")],
                vec![],
            ))
            .await
            .unwrap();

        assert_eq!(held.networks[0].network_id, "vpc-old");
        assert_eq!(held.subnets_of("vpc-old").count(), 1);
        let now = store.snapshot().await.unwrap();
        assert_eq!(now.networks[0].network_id, "vpc-new");
        assert!(now.generation > held.generation);
    }

    #[tokio::test]
    async fn test_swap_rejects_inconsistent_snapshot() {
        let store = MemoryStore::new();
        store.upsert_network(network("vpc-1", "10.1.0.0/16")).await.unwrap();
        let bad = TopologySnapshot::new(
            vec![network("vpc-2", "10.2.0.0/16")],
            vec![subnet("subnet-x", "vpc-2", "10.3.1.0/24")],
        );
        assert!(store.swap_in(bad).await.is_err());
        assert!(store.query_network("vpc-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_caller_scores_are_rederived() {
        let store = MemoryStore::new();
        let mut vpc = network("vpc-1", "10.1.0.0/16");
        vpc.utilization_score = 77.0;
        store.upsert_network(vpc).await.unwrap();
        let mut idle = subnet("subnet-1", "vpc-1", "10.1.1.0/24");
        idle.available_addresses = idle.total_addresses;
        idle.utilization_score = 99.0;
        store.upsert_subnet(idle).await.unwrap();

        let snap = store.snapshot().await.unwrap();
        let listed = &list_vpcs(&snap).vpcs[0];
        let details = vpc_details(&snap, "vpc-1").unwrap();
        let graded = grade_vpc(&snap, "vpc-1").unwrap();
        assert_eq!(listed.utilization_score, 0.0);
        assert_eq!(details.subnets[0].utilization_score, 0.0);
        assert_eq!(graded.utilization_score, listed.utilization_score);
        assert_eq!(graded.utilization_grade, listed.grade);
        assert_eq!(graded.subnets[0].utilization_score, details.subnets[0].utilization_score);

        // Counters changing later moves the stored scores with them.
        let mut busy = subnet("subnet-1", "vpc-1", "10.1.1.0/24");
        busy.available_addresses = 0;
        busy.utilization_score = 1.0;
        store.upsert_subnet(busy).await.unwrap();
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.subnets[0].utilization_score, 100.0);
        assert_eq!(snap.networks[0].utilization_score, 100.0);
        assert_eq!(
            grade_vpc(&snap, "vpc-1").unwrap().utilization_score,
            list_vpcs(&snap).vpcs[0].utilization_score
        );
    }

    #[tokio::test]
    async fn test_swap_in_rederives_scores() {
        let store = MemoryStore::new();
        let mut vpc = network("vpc-1", "10.1.0.0/16");
        vpc.utilization_score = 5.0;
        store
            .swap_in(TopologySnapshot::new(
                vec![vpc],
                vec![subnet("subnet-1", "vpc-1", "10.1.1.0/24")],
            ))
            .await
            .unwrap();
        // 151 of 251 used
        let snap = store.snapshot().await.unwrap();
        assert_eq!(snap.networks[0].utilization_score, 60.16);
    }

    #[tokio::test]
    async fn test_orphan_subnet_is_a_persistence_failure() {
        let store = MemoryStore::new();
        let err = store
            .upsert_subnet(subnet("subnet-1", "vpc-404", "10.1.1.0/24"))
            .await
            .unwrap_err();
        assert!(err.message.contains("parent network vpc-404 not found"));
    }
}
