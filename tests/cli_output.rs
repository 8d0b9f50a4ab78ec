//! Tests for CLI output formatting.
//!
//! Covers JSON output with --json and pretty-print output as default.

use onapp::{Hypervisor, PrettyPrint, Transaction, User, VirtualMachine};

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_json_output_is_unenveloped_object() {
    // --json prints the model itself, not the wire envelope
    let vm = make_test_virtual_machine();
    let json_output = serde_json::to_string_pretty(&vm).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert!(parsed.is_object());
    assert!(parsed.get("virtual_machine").is_none());
    assert_eq!(parsed["label"], "web-1");
}

#[test]
fn test_json_flag_for_list_outputs_array() {
    let vms = vec![make_test_virtual_machine(), make_test_virtual_machine()];
    let json_output = serde_json::to_string_pretty(&vms).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json_output).unwrap();
    assert!(parsed.is_array());
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_json_output_keeps_transaction_status_lowercase() {
    let tx = make_test_transaction();
    let parsed = serde_json::to_value(&tx).unwrap();

    assert_eq!(parsed["status"], "running");
    assert_eq!(parsed["dependent_transaction_id"], 900);
}

// ============================================================================
// Pretty-Print Tests
// ============================================================================

#[test]
fn test_default_output_is_not_json() {
    let pretty_output = make_test_virtual_machine().pretty_print();

    let parse_result: Result<serde_json::Value, _> = serde_json::from_str(&pretty_output);
    assert!(
        parse_result.is_err(),
        "Default output should NOT be valid JSON"
    );
}

#[test]
fn test_virtual_machine_pretty_print_shows_key_fields() {
    let output = make_test_virtual_machine().pretty_print();

    assert!(output.contains("web-1"), "Should show label");
    assert!(output.contains("Power:          on"), "Should show power state");
    assert!(output.contains("192.0.2.10"), "Should show addresses");
    assert!(output.contains("Ubuntu 22.04 x64"), "Should show template");
    assert!(!output.contains("Locked"), "Unlocked machines omit the flag");
}

#[test]
fn test_hypervisor_pretty_print_shows_memory() {
    let hv: Hypervisor = serde_json::from_value(serde_json::json!({
        "id": 1,
        "label": "hv-kvm-01",
        "online": true,
        "enabled": false,
        "total_memory": 65536,
        "free_memory": 49152
    }))
    .unwrap();

    let output = hv.pretty_print();
    assert!(output.contains("Online:         yes"));
    assert!(output.contains("Enabled:        no"));
    assert!(output.contains("49152 MB free of 65536 MB"));
}

#[test]
fn test_transaction_pretty_print_shows_chain_link() {
    let output = make_test_transaction().pretty_print();

    assert!(output.contains("build_disk"), "Should show action");
    assert!(output.contains("Status:         running"));
    assert!(output.contains("VirtualMachine #101"), "Should show parent");
    assert!(output.contains("Depends on:     #900"));
}

#[test]
fn test_user_pretty_print_shows_roles() {
    let user: User = serde_json::from_value(serde_json::json!({
        "id": 12,
        "login": "jdoe",
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jdoe@example.com",
        "status": "active",
        "roles": [
            {"role": {"id": 1, "label": "Administrator", "identifier": "admin"}},
            {"role": {"id": 2, "label": "User", "identifier": "user"}}
        ]
    }))
    .unwrap();

    let output = user.pretty_print();
    assert!(output.starts_with("User #12: jdoe"));
    assert!(output.contains("Jane Doe"));
    assert!(output.contains("Roles:          Administrator, User"));
}

#[test]
fn test_list_pretty_print_is_table() {
    // The table output from `tabled` contains column headers
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct TestRow {
        id: u64,
        label: String,
    }

    let rows = vec![
        TestRow {
            id: 101,
            label: "web-1".to_string(),
        },
        TestRow {
            id: 102,
            label: "db-1".to_string(),
        },
    ];

    let table_output = Table::new(rows).to_string();

    assert!(table_output.contains("id"), "Should have column headers");
    assert!(table_output.contains("label"), "Should have column headers");
    assert!(table_output.contains("db-1"));
}

// ============================================================================
// Test Helpers
// ============================================================================

fn make_test_virtual_machine() -> VirtualMachine {
    serde_json::from_value(serde_json::json!({
        "id": 101,
        "label": "web-1",
        "hostname": "web-1.example.com",
        "booted": true,
        "cpus": 2,
        "memory": 2048,
        "total_disk_size": 20,
        "template_label": "Ubuntu 22.04 x64",
        "ip_addresses": [
            {"ip_address": {"id": 30, "address": "192.0.2.10"}}
        ],
        "created_at": "2024-04-02T10:14:58Z"
    }))
    .unwrap()
}

fn make_test_transaction() -> Transaction {
    serde_json::from_value(serde_json::json!({
        "id": 901,
        "action": "build_disk",
        "status": "running",
        "parent_type": "VirtualMachine",
        "parent_id": 101,
        "dependent_transaction_id": 900
    }))
    .unwrap()
}
