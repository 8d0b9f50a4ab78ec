//! OnApp API client library.
//!
//! A Rust library for the OnApp cloud control-plane REST API using a
//! trait-based architecture where each operation (Get, List, Create, Edit,
//! Delete) is a trait that resource types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use onapp::{
//!     Get, List, OnAppClient, PollOptions, Transaction, TransactionFilter, VirtualMachine,
//!     VirtualMachineAction,
//! };
//!
//! #[tokio::main]
//! async fn main() -> onapp::Result<()> {
//!     // Create client from environment variables
//!     let client = OnAppClient::from_env()?;
//!
//!     // List all virtual machines
//!     let vms = VirtualMachine::list_all(&client, &()).await?;
//!     println!("Found {} virtual machines", vms.len());
//!
//!     // Reboot one and wait for the job to finish
//!     let vm = VirtualMachine::get(&client, 101).await?;
//!     VirtualMachine::action(&client, vm.id, VirtualMachineAction::Reboot).await?;
//!     let tx = vm
//!         .last_transaction(&client, TransactionFilter::for_action("reboot_virtual_server"))
//!         .await?;
//!     Transaction::wait(&client, tx.id, PollOptions::default()).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized around five operation traits:
//!
//! - [`Get`] - Fetch a single resource by ID
//! - [`List`] - Fetch paginated collections of resources
//! - [`Create`] - Create a resource, optionally under a parent
//! - [`Edit`] - Modify an existing resource
//! - [`Delete`] - Remove a resource, with optional query options
//!
//! Each resource type (like [`Hypervisor`] or [`VirtualMachine`]) implements
//! the traits its API endpoints support. OnApp wraps every resource in a
//! single-key envelope (`{"hypervisor": {...}}`); the [`envelope`] module
//! handles wrapping and unwrapping, keyed by [`Resource::KEY`].
//!
//! Mutating calls start asynchronous [`Transaction`]s on the control panel.
//! Use [`Transaction::last`], [`Transaction::get_by_filter`],
//! [`Transaction::list_by_group`] and [`Transaction::wait`] to follow them.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `ONAPP_URL` (required) - Control panel URL
//! - `ONAPP_USER` (required) - User login or e-mail
//! - `ONAPP_API_KEY` (required) - The user's API key (`ONAPP_PASSWORD` also accepted)
//! - `ONAPP_TIMEOUT_SECS` (optional) - Request timeout, defaults to 300

pub mod cli;
mod client;
pub mod envelope;
mod error;
mod models;
pub mod output;
mod pagination;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::OnAppClient;
pub use error::{OnAppError, Result};
pub use output::PrettyPrint;
pub use pagination::{ListOptions, Page};

// Re-export traits
pub use traits::{Create, Delete, Edit, Get, List, NoOptions, Resource, DEFAULT_PAGE_SIZE};

// Re-export models
pub use models::*;
