//! Mock server state management.
//!
//! Provides the in-memory data store for the mock OnApp API server.
//! Resources are kept as JSON documents grouped by collection path
//! (e.g. `"virtual_machines"`, `"settings/networks/3/ip_addresses"`), each
//! collection remembering its envelope key.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::mock_server::DefaultScenario;
use crate::{
    Hypervisor, IpAddress, Network, Resource, Transaction, TransactionStatus, User,
    VirtualMachine,
};

/// Collection path of transactions.
pub const TRANSACTIONS: &str = "transactions";

/// One collection of enveloped resources.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Envelope key (e.g. `"virtual_machine"`).
    pub key: String,
    /// Documents indexed by id.
    pub items: BTreeMap<u64, Value>,
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Collections indexed by path without the `.json` suffix.
    pub collections: HashMap<String, Collection>,

    /// Global settings served by `settings/configuration.json`.
    pub configuration: Map<String, Value>,

    /// Transactions with these actions end `failed` instead of `complete`.
    pub failing_actions: HashSet<String>,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            next_id: 1000,
            ..Default::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add any resource to a collection.
    pub fn with_resource<T: Resource + Serialize>(mut self, collection: &str, item: &T) -> Self {
        let value = serde_json::to_value(item).unwrap_or(Value::Null);
        self.insert(collection, T::KEY, item.id(), value);
        self
    }

    /// Add a virtual machine to the state.
    pub fn with_virtual_machine(self, vm: VirtualMachine) -> Self {
        self.with_resource("virtual_machines", &vm)
    }

    /// Add a hypervisor to the state.
    pub fn with_hypervisor(self, hypervisor: Hypervisor) -> Self {
        self.with_resource("settings/hypervisors", &hypervisor)
    }

    /// Add a network to the state.
    pub fn with_network(self, network: Network) -> Self {
        self.with_resource("settings/networks", &network)
    }

    /// Add an IP address to a network.
    pub fn with_ip_address(self, network_id: u64, ip: IpAddress) -> Self {
        self.with_resource(&format!("settings/networks/{network_id}/ip_addresses"), &ip)
    }

    /// Add a user to the state.
    pub fn with_user(self, user: User) -> Self {
        self.with_resource("users", &user)
    }

    /// Add a transaction to the state.
    pub fn with_transaction(self, tx: Transaction) -> Self {
        self.with_resource(TRANSACTIONS, &tx)
    }

    /// Set one configuration value.
    pub fn with_setting(mut self, name: &str, value: Value) -> Self {
        self.configuration.insert(name.to_string(), value);
        self
    }

    /// Make transactions with this action end in `failed`.
    pub fn with_failing_action(mut self, action: &str) -> Self {
        self.failing_actions.insert(action.to_string());
        self
    }

    /// Insert or replace a document.
    pub fn insert(&mut self, collection: &str, key: &str, id: u64, value: Value) {
        self.next_id = self.next_id.max(id + 1);
        self.collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                key: key.to_string(),
                items: BTreeMap::new(),
            })
            .items
            .insert(id, value);
    }

    /// Allocate an id no document uses yet.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Envelope key of a collection, if known.
    pub fn key_of(&self, collection: &str) -> Option<&str> {
        self.collections.get(collection).map(|c| c.key.as_str())
    }

    /// Get a document by collection and id.
    pub fn get(&self, collection: &str, id: u64) -> Option<&Value> {
        self.collections.get(collection)?.items.get(&id)
    }

    /// Get a mutable document by collection and id.
    pub fn get_mut(&mut self, collection: &str, id: u64) -> Option<&mut Value> {
        self.collections.get_mut(collection)?.items.get_mut(&id)
    }

    /// Remove a document, returning it.
    pub fn remove(&mut self, collection: &str, id: u64) -> Option<Value> {
        self.collections.get_mut(collection)?.items.remove(&id)
    }

    /// All documents of a collection in id order.
    pub fn list(&self, collection: &str) -> Vec<&Value> {
        self.collections
            .get(collection)
            .map(|c| c.items.values().collect())
            .unwrap_or_default()
    }

    /// Transactions, newest first, optionally for one virtual machine.
    pub fn list_transactions(&self, vm_id: Option<u64>) -> Vec<&Value> {
        let mut txs: Vec<&Value> = self
            .list(TRANSACTIONS)
            .into_iter()
            .filter(|tx| match vm_id {
                Some(id) => {
                    tx.get("parent_type").and_then(Value::as_str) == Some("VirtualMachine")
                        && tx.get("parent_id").and_then(Value::as_u64) == Some(id)
                }
                None => true,
            })
            .collect();
        txs.reverse();
        txs
    }

    /// Queue a transaction and return its id.
    pub fn record_transaction(
        &mut self,
        action: &str,
        parent_type: &str,
        parent_id: u64,
        depends_on: Option<u64>,
    ) -> u64 {
        let id = self.allocate_id();
        let now = chrono::Utc::now().to_rfc3339();
        let tx = serde_json::json!({
            "id": id,
            "action": action,
            "status": TransactionStatus::Pending,
            "parent_type": parent_type,
            "parent_id": parent_id,
            "dependent_transaction_id": depends_on,
            "created_at": now,
            "updated_at": now,
        });
        self.insert(TRANSACTIONS, Transaction::KEY, id, tx);
        id
    }

    /// Move a transaction one step towards its final state.
    ///
    /// Pending becomes running; running becomes complete, or failed for
    /// actions registered with [`MockState::with_failing_action`].
    pub fn advance_transaction(&mut self, id: u64) {
        let failing = self
            .get(TRANSACTIONS, id)
            .and_then(|tx| tx.get("action"))
            .and_then(Value::as_str)
            .is_some_and(|action| self.failing_actions.contains(action));

        let Some(tx) = self.get_mut(TRANSACTIONS, id) else {
            return;
        };
        let next = match tx.get("status").and_then(Value::as_str) {
            Some("pending") => TransactionStatus::Running,
            Some("running") if failing => TransactionStatus::Failed,
            Some("running") => TransactionStatus::Complete,
            _ => return,
        };
        tx["status"] = serde_json::json!(next);
        tx["updated_at"] = Value::from(chrono::Utc::now().to_rfc3339());
    }
}

impl From<DefaultScenario> for MockState {
    fn from(scenario: DefaultScenario) -> Self {
        let mut state = MockState::new();

        for hypervisor in scenario.hypervisors {
            state = state.with_hypervisor(hypervisor);
        }
        for network in scenario.networks {
            state = state.with_network(network);
        }
        for (network_id, ip) in scenario.ip_addresses {
            state = state.with_ip_address(network_id, ip);
        }
        for group in scenario.location_groups {
            state = state.with_resource("settings/location_groups", &group);
        }
        for vm in scenario.virtual_machines {
            state = state.with_virtual_machine(vm);
        }
        for user in scenario.users {
            state = state.with_user(user);
        }
        for tx in scenario.transactions {
            state = state.with_transaction(tx);
        }
        for (name, value) in scenario.settings {
            state = state.with_setting(name, value);
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;

    #[test]
    fn test_state_add_and_get_virtual_machine() {
        let state = MockState::new().with_virtual_machine(Fixtures::virtual_machine(101, "web-1"));

        let vm = state.get("virtual_machines", 101);
        assert!(vm.is_some());
        assert_eq!(vm.unwrap()["label"], "web-1");
        assert_eq!(state.key_of("virtual_machines"), Some("virtual_machine"));
    }

    #[test]
    fn test_allocated_ids_do_not_collide() {
        let mut state = MockState::new().with_user(Fixtures::user(5000, "ops"));
        let id = state.allocate_id();
        assert!(id > 5000);
        assert_ne!(state.allocate_id(), id);
    }

    #[test]
    fn test_transactions_listed_newest_first_and_scoped() {
        let mut state = MockState::new();
        let first = state.record_transaction("provision_virtual_server", "VirtualMachine", 1, None);
        let second = state.record_transaction("startup_virtual_server", "VirtualMachine", 1, Some(first));
        state.record_transaction("destroy_disk", "Disk", 9, None);

        let vm_txs = state.list_transactions(Some(1));
        let ids: Vec<u64> = vm_txs.iter().filter_map(|t| t["id"].as_u64()).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(state.list_transactions(None).len(), 3);
    }

    #[test]
    fn test_state_from_default_scenario() {
        let state = MockState::from(Fixtures::default_scenario());

        assert_eq!(state.list("virtual_machines").len(), 2);
        assert_eq!(state.list("settings/networks/3/ip_addresses").len(), 2);
        assert_eq!(state.key_of("settings/location_groups"), Some("location_group"));
        assert_eq!(state.configuration["default_firewall_policy"], "DROP");
        // Ids handed out later never collide with seeded ones
        assert!(state.next_id > 903);
    }

    #[test]
    fn test_advance_transaction() {
        let mut state = MockState::new().with_failing_action("destroy_disk");
        let ok = state.record_transaction("startup_virtual_server", "VirtualMachine", 1, None);
        let bad = state.record_transaction("destroy_disk", "Disk", 2, None);

        for _ in 0..3 {
            state.advance_transaction(ok);
            state.advance_transaction(bad);
        }

        assert_eq!(state.get(TRANSACTIONS, ok).unwrap()["status"], "complete");
        assert_eq!(state.get(TRANSACTIONS, bad).unwrap()["status"], "failed");
    }
}
