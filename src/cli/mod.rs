//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the onapp binary.

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::client::OnAppClient;
use crate::error::{OnAppError, Result};
use crate::models::VirtualMachineAction;

/// OnApp control panel command-line interface.
#[derive(Parser, Debug)]
#[command(name = "onapp", about = "OnApp API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Control panel URL.
    #[arg(long, global = true, env = "ONAPP_URL")]
    pub url: Option<String>,

    /// User login or e-mail.
    #[arg(long, global = true, env = "ONAPP_USER")]
    pub user: Option<String>,

    /// API key of the user.
    #[arg(long, global = true, env = "ONAPP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "ONAPP_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build a client from the connection flags, falling back to the
    /// environment for anything not given.
    pub fn client(&self) -> Result<OnAppClient> {
        let (Some(url), Some(user), Some(api_key)) = (&self.url, &self.user, &self.api_key)
        else {
            return OnAppClient::from_env();
        };

        let client = OnAppClient::new(user, api_key, url)?;
        match self.timeout {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => Ok(client),
        }
    }

    /// Log level selected by the `-v` count.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single resource by ID.
    Get {
        /// The type of resource to get.
        entity: Entity,

        /// The resource ID.
        id: u64,

        /// Parent ID for nested resources (network for IP addresses).
        #[arg(long)]
        parent: Option<u64>,
    },

    /// List resources with optional pagination.
    List {
        /// The type of resource to list.
        entity: Entity,

        /// Page number (1-indexed).
        #[arg(long)]
        page: Option<u32>,

        /// Number of items per page.
        #[arg(long)]
        count: Option<u32>,

        /// Parent ID for nested resources (virtual machine for disks,
        /// backups and transactions; network for IP addresses).
        #[arg(long)]
        parent: Option<u64>,
    },

    /// Delete a resource.
    Delete {
        /// The type of resource to delete.
        entity: Entity,

        /// The resource ID.
        id: u64,

        /// Destroy all backups along with a virtual machine.
        #[arg(long)]
        destroy_backups: bool,

        /// Erase a user immediately instead of marking it deleted.
        #[arg(long)]
        force: bool,
    },

    /// Run a power or maintenance action on a virtual machine.
    Vm {
        /// startup, shutdown, stop, reboot, suspend, unlock or reset_password.
        #[arg(value_parser = parse_action)]
        action: VirtualMachineAction,

        /// The virtual machine ID.
        id: u64,

        /// Wait for the resulting transaction to finish.
        #[arg(long)]
        wait: bool,
    },

    /// Follow transactions.
    #[command(subcommand)]
    Transaction(TransactionCommand),
}

/// Transaction subcommands.
#[derive(Subcommand, Debug)]
pub enum TransactionCommand {
    /// Poll a transaction until it finishes.
    Wait {
        id: u64,

        /// Seconds between polls.
        #[arg(long = "poll-interval", default_value_t = 10)]
        poll_interval: u64,

        /// Seconds before giving up. Separate from the global request `--timeout`.
        #[arg(long = "wait-timeout", default_value_t = 3600)]
        wait_timeout: u64,
    },

    /// Show the most recent transaction matching the given criteria.
    Last {
        /// Only transactions of this virtual machine.
        #[arg(long)]
        vm: Option<u64>,

        /// Transaction action, e.g. provision_virtual_server.
        #[arg(long)]
        action: Option<String>,
    },

    /// Show a transaction and everything queued behind it.
    Group {
        id: u64,

        /// Only transactions of this virtual machine.
        #[arg(long)]
        vm: Option<u64>,
    },
}

/// Resource types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A virtual machine.
    #[value(alias = "vm", alias = "vms", alias = "virtual-machines")]
    VirtualMachine,
    /// A hypervisor (compute resource).
    #[value(alias = "hypervisors")]
    Hypervisor,
    /// A hypervisor (compute) zone.
    #[value(alias = "hypervisor-zones")]
    HypervisorZone,
    /// A data store.
    #[value(alias = "data-stores")]
    DataStore,
    /// A network.
    #[value(alias = "networks")]
    Network,
    /// An IP address in a network.
    #[value(alias = "ip-addresses")]
    IpAddress,
    /// A virtual machine disk.
    #[value(alias = "disks")]
    Disk,
    /// A disk backup.
    #[value(alias = "backups")]
    Backup,
    /// An image template.
    #[value(alias = "template", alias = "templates")]
    ImageTemplate,
    /// A control panel user.
    #[value(alias = "users")]
    User,
    /// A location group.
    #[value(alias = "location-groups")]
    LocationGroup,
    /// A transaction.
    #[value(alias = "transactions")]
    Transaction,
}

fn parse_action(raw: &str) -> std::result::Result<VirtualMachineAction, String> {
    raw.parse().map_err(|e: OnAppError| e.to_string())
}
