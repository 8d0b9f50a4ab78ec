//! Mock OnApp API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the OnApp API
//! for integration and end-to-end testing. Unlike wiremock which mocks at the
//! HTTP level per-test, this server maintains state across requests and
//! queues transactions for mutating calls, enabling realistic workflow
//! testing.
//!
//! # Example
//!
//! ```ignore
//! use onapp::mock_server::MockServer;
//! use onapp::{Get, OnAppClient, VirtualMachine};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = OnAppClient::new("admin", "key", server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let vm = VirtualMachine::get(&client, 101).await.unwrap();
//!     assert_eq!(vm.label, "web-1");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{Collection, MockState};
