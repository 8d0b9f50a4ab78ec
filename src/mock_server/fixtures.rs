//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    Hypervisor, IpAddress, LocationGroup, Network, Transaction, TransactionStatus, User,
    VirtualMachine,
};

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// Decode a fixture document. Fixture literals always match their model.
fn build<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture matches model")
}

impl Fixtures {
    // =========================================================================
    // Compute Fixtures
    // =========================================================================

    /// Create a powered-off virtual machine with required fields only.
    pub fn virtual_machine(id: u64, label: &str) -> VirtualMachine {
        build(json!({
            "id": id,
            "label": label,
            "identifier": format!("vm{id:x}qz"),
            "hostname": format!("{label}.example.com"),
            "booted": false,
            "built": true,
            "cpus": 1,
            "memory": 1024,
            "total_disk_size": 10,
            "template_id": 5,
            "template_label": "Ubuntu 22.04 x64",
            "operating_system": "linux",
        }))
    }

    /// Create a running virtual machine with one address.
    pub fn running_virtual_machine(id: u64, label: &str, address: &str) -> VirtualMachine {
        let mut vm = Self::virtual_machine(id, label);
        vm.booted = true;
        vm.hypervisor_id = Some(1);
        vm.ip_addresses = build(json!([
            {"ip_address": {"id": id * 10, "address": address, "free": false}}
        ]));
        vm
    }

    /// Create an online KVM hypervisor.
    pub fn hypervisor(id: u64, label: &str, ip: &str) -> Hypervisor {
        build(json!({
            "id": id,
            "label": label,
            "ip_address": ip,
            "hypervisor_type": "kvm",
            "hypervisor_group_id": 1,
            "server_type": "virtual",
            "enabled": true,
            "online": true,
            "cpus": 16,
            "cpu_cores": 32,
            "total_memory": 65536,
            "free_memory": 49152,
        }))
    }

    // =========================================================================
    // Network Fixtures
    // =========================================================================

    /// Create a VLAN network.
    pub fn network(id: u64, label: &str, vlan: u32) -> Network {
        build(json!({
            "id": id,
            "label": label,
            "vlan": vlan,
            "network_group_id": 1,
            "identifier": format!("net{id}"),
        }))
    }

    /// Create an address in a /24.
    pub fn ip_address(id: u64, network_id: u64, address: &str, free: bool) -> IpAddress {
        build(json!({
            "id": id,
            "address": address,
            "prefix": 24,
            "gateway": "192.0.2.1",
            "free": free,
            "network_id": network_id,
        }))
    }

    pub fn location_group(id: u64, city: &str, country: &str) -> LocationGroup {
        build(json!({
            "id": id,
            "city": city,
            "country": country,
            "federated": false,
            "cdn_enabled": false,
        }))
    }

    // =========================================================================
    // User Fixtures
    // =========================================================================

    /// Create an active user.
    pub fn user(id: u64, login: &str) -> User {
        build(json!({
            "id": id,
            "login": login,
            "email": format!("{login}@example.com"),
            "status": "active",
            "billing_plan_id": 1,
            "user_group_id": 1,
            "time_zone": "UTC",
            "roles": [{"role": {"id": 2, "label": "User", "identifier": "user"}}],
        }))
    }

    // =========================================================================
    // Transaction Fixtures
    // =========================================================================

    /// Create a transaction run for a virtual machine.
    pub fn transaction(
        id: u64,
        action: &str,
        status: TransactionStatus,
        vm_id: u64,
        depends_on: Option<u64>,
    ) -> Transaction {
        build(json!({
            "id": id,
            "action": action,
            "status": status,
            "parent_type": "VirtualMachine",
            "parent_id": vm_id,
            "dependent_transaction_id": depends_on,
            "priority": 10,
        }))
    }

    // =========================================================================
    // Scenario Fixtures
    // =========================================================================

    /// Create a complete test scenario with related data.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario {
            hypervisors: vec![
                Self::hypervisor(1, "hv-kvm-01", "10.0.50.11"),
                Self::hypervisor(2, "hv-kvm-02", "10.0.50.12"),
            ],
            networks: vec![Self::network(3, "Public VLAN 100", 100)],
            ip_addresses: vec![
                (3, Self::ip_address(30, 3, "192.0.2.10", false)),
                (3, Self::ip_address(31, 3, "192.0.2.11", true)),
            ],
            location_groups: vec![Self::location_group(1, "Amsterdam", "Netherlands")],
            virtual_machines: vec![
                Self::running_virtual_machine(101, "web-1", "192.0.2.10"),
                Self::virtual_machine(102, "db-1"),
            ],
            users: vec![Self::user(1, "admin"), Self::user(12, "jdoe")],
            transactions: vec![
                Self::transaction(
                    900,
                    "provision_virtual_server",
                    TransactionStatus::Complete,
                    101,
                    None,
                ),
                Self::transaction(
                    901,
                    "build_disk",
                    TransactionStatus::Complete,
                    101,
                    Some(900),
                ),
                Self::transaction(
                    902,
                    "startup_virtual_server",
                    TransactionStatus::Complete,
                    101,
                    Some(901),
                ),
                Self::transaction(
                    903,
                    "provision_virtual_server",
                    TransactionStatus::Failed,
                    102,
                    None,
                ),
            ],
            settings: vec![
                ("system_host", json!("cp.example.com")),
                ("system_email", json!("noc@example.com")),
                ("allow_incremental_backups", json!(true)),
                ("default_firewall_policy", json!("DROP")),
            ],
        }
    }
}

/// A complete test scenario with related data.
pub struct DefaultScenario {
    pub hypervisors: Vec<Hypervisor>,
    pub networks: Vec<Network>,
    /// Addresses paired with their network id.
    pub ip_addresses: Vec<(u64, IpAddress)>,
    pub location_groups: Vec<LocationGroup>,
    pub virtual_machines: Vec<VirtualMachine>,
    pub users: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub settings: Vec<(&'static str, Value)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_is_consistent() {
        let scenario = Fixtures::default_scenario();

        assert_eq!(scenario.hypervisors.len(), 2);
        assert!(scenario.virtual_machines[0].booted);
        assert_eq!(scenario.virtual_machines[0].addresses(), vec!["192.0.2.10"]);

        for tx in &scenario.transactions {
            if let Some(dep) = tx.dependent_transaction_id {
                assert!(scenario.transactions.iter().any(|t| t.id == dep));
            }
        }
    }
}
