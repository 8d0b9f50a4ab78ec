//! E2E tests using the mock OnApp server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use std::time::Duration;

use onapp::mock_server::{Fixtures, MockServer, MockState};
use onapp::{
    Configuration, ConfigurationParams, Create, DataStoreJoin, DataStoreJoinParams, Delete, Edit,
    Get, IpAddress, IpAddressParams, JoinTarget, List, Network, NetworkParams, NoOptions,
    OnAppClient, OnAppError, PollOptions, Transaction, TransactionFilter, TransactionScope,
    TransactionStatus, User, VirtualMachine, VirtualMachineAction, VirtualMachineCreateParams,
};

fn client_for(server: &MockServer) -> OnAppClient {
    OnAppClient::new("admin", "test-key", server.url()).unwrap()
}

fn fast_poll() -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    }
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    // After shutdown, server should not respond
    let client = reqwest::Client::new();
    let result = client.get(format!("{}/health", url)).send().await;

    assert!(result.is_err());
}

// =============================================================================
// Virtual Machine Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_provision_queues_dependent_chain() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let params = VirtualMachineCreateParams {
        label: "web-2".into(),
        hostname: "web-2.example.com".into(),
        template_id: 5,
        memory: Some(1024),
        ..Default::default()
    };
    let vm = VirtualMachine::create(&client, (), params)
        .await
        .expect("Failed to create virtual machine");
    assert!(!vm.booted);
    assert!(vm.locked);

    // Step 1: find the provisioning transaction
    let provision = vm
        .last_transaction(
            &client,
            TransactionFilter::for_action("provision_virtual_server"),
        )
        .await
        .expect("Provisioning transaction not queued");

    // Step 2: the whole chain hangs off it in dependency order
    let chain =
        Transaction::list_by_group(&client, &TransactionScope::VirtualMachine(vm.id), provision.id)
            .await
            .unwrap();
    let actions: Vec<&str> = chain.iter().map(|t| t.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["provision_virtual_server", "build_disk", "startup_virtual_server"]
    );

    // Step 3: every link completes
    for tx in &chain {
        let done = Transaction::wait(&client, tx.id, fast_poll()).await.unwrap();
        assert_eq!(done.status, TransactionStatus::Complete);
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_create_without_hostname_is_rejected() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    // Typed params always carry a hostname, so post the body directly
    let response = reqwest::Client::new()
        .post(format!("{}/virtual_machines.json", server.url()))
        .json(&serde_json::json!({"virtual_machine": {"label": "x", "template_id": 5}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    let vms = VirtualMachine::list_all(&client, &()).await.unwrap();
    assert_eq!(vms.len(), 2, "Rejected create must not add a machine");

    server.shutdown().await;
}

#[tokio::test]
async fn test_power_action_and_wait() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    VirtualMachine::action(&client, 102, VirtualMachineAction::Startup)
        .await
        .unwrap();

    let vm = VirtualMachine::get(&client, 102).await.unwrap();
    let tx = vm
        .last_transaction(
            &client,
            TransactionFilter::for_action("startup_virtual_server"),
        )
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Pending);

    let done = Transaction::wait(&client, tx.id, fast_poll()).await.unwrap();
    assert_eq!(done.status, TransactionStatus::Complete);

    let status = VirtualMachine::status(&client, 102).await.unwrap();
    assert!(status.booted);

    server.shutdown().await;
}

#[tokio::test]
async fn test_failing_action_reports_transaction_failed() {
    let state = MockState::new()
        .with_virtual_machine(Fixtures::running_virtual_machine(7, "app-1", "192.0.2.70"))
        .with_failing_action("reboot_virtual_server");
    let server = MockServer::with_state(state).await;
    let client = client_for(&server);

    VirtualMachine::action(&client, 7, VirtualMachineAction::Reboot)
        .await
        .unwrap();
    let tx = Transaction::last(
        &client,
        &TransactionScope::VirtualMachine(7),
        &TransactionFilter::for_action("reboot_virtual_server"),
    )
    .await
    .unwrap();

    let err = Transaction::wait(&client, tx.id, fast_poll())
        .await
        .unwrap_err();
    assert!(matches!(err, OnAppError::TransactionFailed { id, .. } if id == tx.id));

    server.shutdown().await;
}

#[tokio::test]
async fn test_failed_transaction_from_scenario() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let failed = Transaction::get_by_filter(
        &client,
        &TransactionScope::All,
        &TransactionFilter::default().status(TransactionStatus::Failed),
        Default::default(),
    )
    .await
    .unwrap();

    assert_eq!(failed.id, 903);
    assert_eq!(failed.parent_id, Some(102));

    server.shutdown().await;
}

#[tokio::test]
async fn test_delete_virtual_machine_queues_destroy() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    VirtualMachine::delete(&client, 102, Default::default())
        .await
        .unwrap();

    let err = VirtualMachine::get(&client, 102).await.unwrap_err();
    assert!(err.is_not_found());

    let destroy = Transaction::last(
        &client,
        &TransactionScope::All,
        &TransactionFilter::for_action("destroy_virtual_server").parent("VirtualMachine", 102),
    )
    .await
    .unwrap();
    assert_eq!(destroy.status, TransactionStatus::Pending);

    server.shutdown().await;
}

// =============================================================================
// Generic Resource Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_network_create_edit_delete() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let network = Network::create(
        &client,
        (),
        NetworkParams {
            label: Some("Private VLAN 200".into()),
            vlan: Some(200),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(network.vlan, Some(200));

    Network::edit(
        &client,
        network.id,
        NetworkParams {
            label: Some("Backend".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let edited = Network::get(&client, network.id).await.unwrap();
    assert_eq!(edited.label, "Backend");
    assert_eq!(edited.vlan, Some(200));

    Network::delete(&client, network.id, NoOptions::default())
        .await
        .unwrap();
    let err = Network::get(&client, network.id).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}

#[tokio::test]
async fn test_data_store_join_accepts_bare_body() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let join = DataStoreJoin::create(
        &client,
        JoinTarget::Hypervisor(1),
        DataStoreJoinParams { data_store_id: 7 },
    )
    .await
    .unwrap();
    assert_eq!(join.data_store_id, 7);
    assert_eq!(join.target(), Some(JoinTarget::Hypervisor(1)));

    let zone_join = DataStoreJoin::create(
        &client,
        JoinTarget::HypervisorZone(2),
        DataStoreJoinParams { data_store_id: 8 },
    )
    .await
    .unwrap();
    assert_eq!(zone_join.target(), Some(JoinTarget::HypervisorZone(2)));

    let joins = DataStoreJoin::list_all(&client, &JoinTarget::Hypervisor(1))
        .await
        .unwrap();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].id, join.id);

    DataStoreJoin::delete(&client, (JoinTarget::Hypervisor(1), join.id), NoOptions::default())
        .await
        .unwrap();
    let joins = DataStoreJoin::list_all(&client, &JoinTarget::Hypervisor(1))
        .await
        .unwrap();
    assert!(joins.is_empty());

    server.shutdown().await;
}

#[tokio::test]
async fn test_ip_addresses_are_scoped_to_network() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let network = Network::get(&client, 3).await.unwrap();
    let before = network.ip_addresses(&client).await.unwrap();
    assert_eq!(before.len(), 2);

    let added = IpAddress::create(
        &client,
        3,
        IpAddressParams {
            address: Some("192.0.2.12".into()),
            prefix: Some(24),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let fetched = IpAddress::get(&client, (3, added.id)).await.unwrap();
    assert_eq!(fetched.address, "192.0.2.12");

    // Another network does not see it
    assert!(IpAddress::get(&client, (4, added.id)).await.is_err());

    server.shutdown().await;
}

#[tokio::test]
async fn test_configuration_round_trip() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let before = Configuration::get(&client, ()).await.unwrap();
    assert_eq!(before.system_host.as_deref(), Some("cp.example.com"));

    Configuration::edit(
        &client,
        (),
        ConfigurationParams {
            system_host: Some("cp2.example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let after = Configuration::get(&client, ()).await.unwrap();
    assert_eq!(after.system_host.as_deref(), Some("cp2.example.com"));
    assert_eq!(
        after.setting("default_firewall_policy"),
        Some(serde_json::json!("DROP"))
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_users_from_scenario() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let users = User::list_all(&client, &()).await.unwrap();
    let logins: Vec<&str> = users.iter().map(|u| u.login.as_str()).collect();
    assert_eq!(logins, vec!["admin", "jdoe"]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_empty_server_returns_empty_lists() {
    let server = MockServer::start_empty().await;
    let client = client_for(&server);

    let vms = VirtualMachine::list_all(&client, &()).await.unwrap();
    assert!(vms.is_empty());

    let txs = Transaction::list_all(&client, &TransactionScope::All)
        .await
        .unwrap();
    assert!(txs.is_empty());

    let err = VirtualMachine::get(&client, 101).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}
