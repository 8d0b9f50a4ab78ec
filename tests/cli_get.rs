//! Execution tests for get operations.
//!
//! Uses wiremock to mock the OnApp API and test actual execution flow.

use onapp::{Configuration, Get, Hypervisor, IpAddress, OnAppClient, OnAppError, User, VirtualMachine};
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OnAppClient {
    OnAppClient::new("admin", "test-key", &server.uri()).unwrap()
}

#[tokio::test]
async fn test_get_virtual_machine_unwraps_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/virtual_machines/101.json"))
        .and(basic_auth("admin", "test-key"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "virtual_machine": {
                "id": 101,
                "label": "web-1",
                "hostname": "web-1.example.com",
                "booted": true,
                "memory": 2048,
                "ip_addresses": [
                    {"ip_address": {"id": 30, "address": "192.0.2.10"}}
                ]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let vm = VirtualMachine::get(&client(&mock_server), 101).await.unwrap();

    assert_eq!(vm.label, "web-1");
    assert!(vm.booted);
    assert_eq!(vm.addresses(), vec!["192.0.2.10"]);
}

#[tokio::test]
async fn test_get_nested_resource_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/networks/3/ip_addresses/31.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip_address": {"id": 31, "address": "192.0.2.11", "free": true, "network_id": 3}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ip = IpAddress::get(&client(&mock_server), (3, 31)).await.unwrap();

    assert_eq!(ip.address, "192.0.2.11");
    assert!(ip.free);
}

#[tokio::test]
async fn test_get_with_wrong_envelope_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/hypervisors/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data_store": {"id": 1, "label": "ds"}
        })))
        .mount(&mock_server)
        .await;

    let err = Hypervisor::get(&client(&mock_server), 1).await.unwrap_err();

    assert!(matches!(err, OnAppError::Envelope { expected: "hypervisor" }));
}

#[tokio::test]
async fn test_get_missing_resource_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/404.json"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"errors": ["Resource not found"]})),
        )
        .mount(&mock_server)
        .await;

    let err = User::get(&client(&mock_server), 404).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_get_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/1.json"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"errors": ["Access denied"]})),
        )
        .mount(&mock_server)
        .await;

    let err = User::get(&client(&mock_server), 1).await.unwrap_err();

    assert!(matches!(err, OnAppError::Unauthorized { status_code: 401 }));
}

#[tokio::test]
async fn test_server_error_message_is_flattened() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/hypervisors/1.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "errors": {"base": ["Hypervisor is offline"]}
        })))
        .mount(&mock_server)
        .await;

    let err = Hypervisor::get(&client(&mock_server), 1).await.unwrap_err();

    match err {
        OnAppError::ApiError {
            message,
            status_code,
        } => {
            assert_eq!(message, "Hypervisor is offline");
            assert_eq!(status_code, Some(500));
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reports_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/virtual_machines/101.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    let err = VirtualMachine::get(&client(&mock_server), 101)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OnAppError::RateLimited {
            retry_after_secs: Some(30)
        }
    ));
}

#[tokio::test]
async fn test_get_configuration_uses_settings_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/configuration.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "settings": {
                "system_host": "cp.example.com",
                "default_firewall_policy": "DROP"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = Configuration::get(&client(&mock_server), ()).await.unwrap();

    assert_eq!(config.system_host.as_deref(), Some("cp.example.com"));
    assert_eq!(
        config.setting("default_firewall_policy"),
        Some(serde_json::json!("DROP"))
    );
}

#[tokio::test]
async fn test_get_calls_trait_method_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/hypervisors/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hypervisor": {"id": 1, "label": "hv-kvm-01"}
        })))
        .expect(1) // Verify the trait method was called exactly once
        .mount(&mock_server)
        .await;

    let _ = Hypervisor::get(&client(&mock_server), 1).await;

    // wiremock verifies the expectation on MockServer drop
}
