//! Virtual machine model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, BoolFromInt};

use crate::client::OnAppClient;
use crate::envelope::{self, collection_path, item_path};
use crate::error::Result;
use crate::models::backup::Backup;
use crate::models::disk::Disk;
use crate::models::ip_address::IpAddress;
use crate::models::network_interface::NetworkInterface;
use crate::models::transaction::{Transaction, TransactionFilter, TransactionScope};
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, Resource};

const PATH: &str = "virtual_machines";

/// A virtual machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub hostname: Option<String>,

    /// Whether the machine is powered on.
    #[serde(default)]
    pub booted: bool,

    #[serde(default)]
    pub built: bool,

    /// Locked while a transaction runs against the machine.
    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub suspended: bool,

    #[serde(default)]
    pub recovery_mode: bool,

    #[serde(default)]
    pub hypervisor_id: Option<u64>,

    #[serde(default)]
    pub template_id: Option<u64>,

    #[serde(default)]
    pub template_label: Option<String>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub instance_package_id: Option<u64>,

    #[serde(default)]
    pub cpus: Option<u32>,

    #[serde(default)]
    pub cpu_shares: Option<u32>,

    /// Memory in MB.
    #[serde(default)]
    pub memory: Option<u64>,

    /// Sum of all disk sizes in GB.
    #[serde(default)]
    pub total_disk_size: Option<u64>,

    /// e.g. "linux", "windows".
    #[serde(default)]
    pub operating_system: Option<String>,

    #[serde(default)]
    pub operating_system_distro: Option<String>,

    #[serde(default)]
    pub remote_access_password: Option<String>,

    #[serde(default)]
    pub initial_root_password: Option<String>,

    #[serde(default)]
    pub ip_addresses: Vec<IpAddressEntry>,

    /// Bandwidth used this month, in KB.
    #[serde(default)]
    pub monthly_bandwidth_used: Option<u64>,

    #[serde(default)]
    pub price_per_hour: Option<f64>,

    #[serde(default)]
    pub price_per_hour_powered_off: Option<f64>,

    #[serde(default)]
    pub allowed_swap: bool,

    #[serde(default)]
    pub allowed_hot_migrate: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enveloped address as embedded in the virtual machine payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddressEntry {
    pub ip_address: IpAddress,
}

/// Power and lock state as reported by the status endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualMachineStatus {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub booted: bool,
    #[serde(default)]
    pub built: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub recovery_mode: bool,
}

/// Power and maintenance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualMachineAction {
    Startup,
    /// Graceful ACPI shutdown.
    Shutdown,
    /// Hard power off.
    Stop,
    Reboot,
    /// Toggles the suspended flag.
    Suspend,
    Unlock,
    ResetPassword,
}

impl VirtualMachineAction {
    /// Endpoint name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Stop => "stop",
            Self::Reboot => "reboot",
            Self::Suspend => "suspend",
            Self::Unlock => "unlock",
            Self::ResetPassword => "reset_password",
        }
    }

    /// Transaction action name OnApp records for this action, if any.
    pub fn transaction_action(&self) -> Option<&'static str> {
        match self {
            Self::Startup => Some("startup_virtual_server"),
            Self::Shutdown => Some("shutdown_virtual_server"),
            Self::Stop => Some("stop_virtual_server"),
            Self::Reboot => Some("reboot_virtual_server"),
            Self::ResetPassword => Some("reset_root_password"),
            Self::Suspend | Self::Unlock => None,
        }
    }
}

impl std::str::FromStr for VirtualMachineAction {
    type Err = crate::OnAppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "startup" | "start" => Ok(Self::Startup),
            "shutdown" => Ok(Self::Shutdown),
            "stop" => Ok(Self::Stop),
            "reboot" => Ok(Self::Reboot),
            "suspend" => Ok(Self::Suspend),
            "unlock" => Ok(Self::Unlock),
            "reset_password" | "reset-password" => Ok(Self::ResetPassword),
            other => Err(crate::OnAppError::InvalidArgument(format!(
                "unknown virtual machine action '{other}'"
            ))),
        }
    }
}

impl VirtualMachine {
    /// Addresses assigned to the machine.
    pub fn addresses(&self) -> Vec<&str> {
        self.ip_addresses
            .iter()
            .map(|e| e.ip_address.address.as_str())
            .collect()
    }

    /// Run a power or maintenance action.
    ///
    /// The action is queued as a transaction; see
    /// [`VirtualMachine::action_transaction`] to follow it.
    #[tracing::instrument(skip(client))]
    pub async fn action(client: &OnAppClient, id: u64, action: VirtualMachineAction) -> Result<()> {
        client
            .post_empty(&format!("{PATH}/{id}/{}.json", action.as_str()))
            .await?;
        Ok(())
    }

    /// Run an action and return the transaction it queued.
    ///
    /// The newest matching transaction is noted before the action is posted
    /// and only a later one is accepted afterwards, so an earlier run of the
    /// same action is never returned. `None` for actions OnApp runs without
    /// a transaction.
    ///
    /// # Errors
    ///
    /// `NotFound` when no new transaction shows up on the first page.
    #[tracing::instrument(skip(client))]
    pub async fn action_transaction(
        client: &OnAppClient,
        id: u64,
        action: VirtualMachineAction,
    ) -> Result<Option<Transaction>> {
        let Some(tx_action) = action.transaction_action() else {
            Self::action(client, id, action).await?;
            return Ok(None);
        };

        let scope = TransactionScope::VirtualMachine(id);
        let filter = TransactionFilter::for_action(tx_action);
        let previous = match Transaction::last(client, &scope, &filter).await {
            Ok(tx) => Some(tx.id),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        tracing::debug!(?previous, "Latest transaction before action");

        Self::action(client, id, action).await?;

        let filter = match previous {
            Some(previous) => filter.newer_than(previous),
            None => filter,
        };
        Transaction::last(client, &scope, &filter).await.map(Some)
    }

    /// Fetch the current power and lock state.
    #[tracing::instrument(skip(client))]
    pub async fn status(client: &OnAppClient, id: u64) -> Result<VirtualMachineStatus> {
        client
            .fetch(&format!("{PATH}/{id}/status.json"), Self::KEY)
            .await
    }

    /// Rebuild the machine, optionally from a different template.
    #[tracing::instrument(skip(client))]
    pub async fn rebuild(client: &OnAppClient, id: u64, params: RebuildParams) -> Result<()> {
        let body = envelope::wrap(Self::KEY, &params)?;
        client.post(&format!("{PATH}/{id}/build.json"), &body).await?;
        Ok(())
    }

    /// Disks attached to this machine.
    pub async fn disks(&self, client: &OnAppClient) -> Result<Vec<Disk>> {
        Disk::list_all(client, &self.id).await
    }

    /// Network interfaces of this machine.
    pub async fn network_interfaces(&self, client: &OnAppClient) -> Result<Vec<NetworkInterface>> {
        NetworkInterface::list_all(client, &self.id).await
    }

    /// Backups of this machine's disks.
    pub async fn backups(&self, client: &OnAppClient) -> Result<Vec<Backup>> {
        Backup::list_all(client, &self.id).await
    }

    /// Transactions recorded against this machine.
    pub async fn transactions(&self, client: &OnAppClient) -> Result<Vec<Transaction>> {
        Transaction::list_all(client, &TransactionScope::VirtualMachine(self.id)).await
    }

    /// The most recent transaction of this machine matching `filter`.
    pub async fn last_transaction(
        &self,
        client: &OnAppClient,
        filter: TransactionFilter,
    ) -> Result<Transaction> {
        Transaction::last(client, &TransactionScope::VirtualMachine(self.id), &filter).await
    }
}

/// Parameters for creating a virtual machine.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualMachineCreateParams {
    pub label: String,
    pub hostname: String,
    pub template_id: u64,
    /// Memory in MB.
    pub memory: Option<u64>,
    pub cpus: Option<u32>,
    pub cpu_shares: Option<u32>,
    /// Primary disk size in GB.
    pub primary_disk_size: Option<u64>,
    /// Swap disk size in GB.
    pub swap_disk_size: Option<u64>,
    pub instance_package_id: Option<u64>,
    pub hypervisor_id: Option<u64>,
    pub hypervisor_group_id: Option<u64>,
    pub location_group_id: Option<u64>,
    pub data_store_group_primary_id: Option<u64>,
    pub data_store_group_swap_id: Option<u64>,
    pub primary_network_id: Option<u64>,
    pub primary_network_group_id: Option<u64>,
    pub selected_ip_address: Option<String>,
    pub rate_limit: Option<u32>,
    pub initial_root_password: Option<String>,
    pub licensing_type: Option<String>,
    pub required_ip_address_assignment: Option<bool>,
    pub required_virtual_machine_build: Option<bool>,
    pub required_virtual_machine_startup: Option<bool>,
}

/// Parameters for editing a virtual machine.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualMachineEditParams {
    pub label: Option<String>,
    pub hostname: Option<String>,
    pub memory: Option<u64>,
    pub cpus: Option<u32>,
    pub cpu_shares: Option<u32>,
    pub allow_resize_without_reboot: Option<bool>,
}

/// Parameters for rebuilding a virtual machine.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebuildParams {
    pub template_id: Option<u64>,
    pub required_startup: Option<bool>,
}

/// Query options for deleting a virtual machine. Flags are sent as 0/1.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualMachineDeleteOptions {
    /// Turn the last backup into a template before deleting.
    #[serde_as(as = "Option<BoolFromInt>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert_last_backup: Option<bool>,

    #[serde_as(as = "Option<BoolFromInt>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destroy_all_backups: Option<bool>,
}

impl Resource for VirtualMachine {
    const KEY: &'static str = "virtual_machine";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for VirtualMachine {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for VirtualMachine {
    type Query = ();

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        _query: &(),
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let params = ListOptions::for_page(page, per_page);
        let items = client
            .fetch_list(&collection_path(PATH), Self::KEY, &params)
            .await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for VirtualMachine {
    type Scope = ();
    type Params = VirtualMachineCreateParams;

    #[tracing::instrument(skip(client, params), fields(label = %params.label))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for VirtualMachine {
    type Id = u64;
    type Params = VirtualMachineEditParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for VirtualMachine {
    type Id = u64;
    type Options = VirtualMachineDeleteOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(
        client: &OnAppClient,
        id: u64,
        options: VirtualMachineDeleteOptions,
    ) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_machine_deserialize() {
        let json = serde_json::json!({
            "virtual_machine": {
                "id": 101,
                "label": "web-01",
                "identifier": "q8f2kd93jd0s1a",
                "hostname": "web-01.example.com",
                "booted": true,
                "built": true,
                "locked": false,
                "suspended": false,
                "hypervisor_id": 12,
                "template_id": 5,
                "template_label": "Ubuntu 22.04 x64",
                "user_id": 1,
                "cpus": 2,
                "cpu_shares": 100,
                "memory": 2048,
                "total_disk_size": 21,
                "operating_system": "linux",
                "operating_system_distro": "ubuntu",
                "ip_addresses": [
                    {"ip_address": {"id": 301, "address": "192.0.2.44", "free": false}}
                ],
                "price_per_hour": 0.02,
                "created_at": "2024-02-10T08:00:00.000+01:00"
            }
        });
        let vm: VirtualMachine = envelope::unwrap_one(VirtualMachine::KEY, json).unwrap();
        assert_eq!(vm.id, 101);
        assert!(vm.booted);
        assert_eq!(vm.addresses(), vec!["192.0.2.44"]);
        assert_eq!(vm.memory, Some(2048));
        assert_eq!(
            vm.created_at.unwrap().to_rfc3339(),
            "2024-02-10T07:00:00+00:00"
        );
    }

    #[test]
    fn test_action_names() {
        assert_eq!(VirtualMachineAction::Startup.as_str(), "startup");
        assert_eq!(VirtualMachineAction::ResetPassword.as_str(), "reset_password");
        assert_eq!(
            "start".parse::<VirtualMachineAction>().unwrap(),
            VirtualMachineAction::Startup
        );
        assert!("explode".parse::<VirtualMachineAction>().is_err());
    }

    #[test]
    fn test_delete_options_as_flags() {
        let opts = VirtualMachineDeleteOptions {
            convert_last_backup: Some(false),
            destroy_all_backups: Some(true),
        };
        assert_eq!(
            serde_qs::to_string(&opts).unwrap(),
            "convert_last_backup=0&destroy_all_backups=1"
        );
        assert_eq!(
            serde_qs::to_string(&VirtualMachineDeleteOptions::default()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_create_params_required_fields() {
        let params = VirtualMachineCreateParams {
            label: "db".to_string(),
            hostname: "db.local".to_string(),
            template_id: 5,
            memory: Some(1024),
            required_virtual_machine_build: Some(true),
            ..Default::default()
        };
        let wrapped = envelope::wrap(VirtualMachine::KEY, &params).unwrap();
        assert_eq!(
            wrapped,
            serde_json::json!({
                "virtual_machine": {
                    "label": "db",
                    "hostname": "db.local",
                    "template_id": 5,
                    "memory": 1024,
                    "required_virtual_machine_build": true
                }
            })
        );
    }
}
