//! Hypervisor (compute resource) model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::models::backup_server_join::BackupServerJoin;
use crate::models::data_store_join::DataStoreJoin;
use crate::models::network_join::NetworkJoin;
use crate::models::target::JoinTarget;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/hypervisors";

/// An OnApp hypervisor, called a compute resource in the control panel.
///
/// Hypervisors host virtual machines and belong to at most one hypervisor
/// zone. Data stores, networks and backup servers are attached to them
/// through join records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hypervisor {
    pub id: u64,

    pub label: String,

    /// Management IP address.
    #[serde(default)]
    pub ip_address: Option<String>,

    /// Virtualization type (e.g., "kvm", "xen", "vcenter").
    #[serde(default)]
    pub hypervisor_type: Option<String>,

    /// The hypervisor zone this hypervisor belongs to.
    #[serde(default)]
    pub hypervisor_group_id: Option<u64>,

    /// Server type (e.g., "virtual", "baremetal", "smart").
    #[serde(default)]
    pub server_type: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    /// Whether the control panel currently reaches the hypervisor.
    #[serde(default)]
    pub online: bool,

    #[serde(default)]
    pub locked: bool,

    /// Whether this hypervisor is a failover spare.
    #[serde(default)]
    pub spare: bool,

    /// Whether the hypervisor also acts as a backup server.
    #[serde(default)]
    pub backup: bool,

    #[serde(default)]
    pub host_id: Option<u64>,

    #[serde(default)]
    pub mac: Option<String>,

    #[serde(default)]
    pub cpus: Option<u32>,

    #[serde(default)]
    pub cpu_cores: Option<u32>,

    #[serde(default)]
    pub cpu_mhz: Option<u32>,

    #[serde(default)]
    pub cpu_units: Option<u32>,

    /// Total memory in MB.
    #[serde(default)]
    pub total_memory: Option<u64>,

    /// Free memory in MB.
    #[serde(default)]
    pub free_memory: Option<u64>,

    #[serde(default)]
    pub failure_count: u32,

    #[serde(default)]
    pub disable_failover: bool,

    #[serde(default)]
    pub called_in_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Hypervisor {
    /// Whether the hypervisor can accept new virtual machines.
    pub fn is_available(&self) -> bool {
        self.enabled && self.online && !self.locked
    }

    /// Memory in use, in MB.
    pub fn used_memory(&self) -> Option<u64> {
        match (self.total_memory, self.free_memory) {
            (Some(total), Some(free)) => Some(total.saturating_sub(free)),
            _ => None,
        }
    }

    /// Data stores attached directly to this hypervisor.
    pub async fn data_store_joins(&self, client: &OnAppClient) -> Result<Vec<DataStoreJoin>> {
        DataStoreJoin::list_all(client, &JoinTarget::Hypervisor(self.id)).await
    }

    /// Networks attached directly to this hypervisor.
    pub async fn network_joins(&self, client: &OnAppClient) -> Result<Vec<NetworkJoin>> {
        NetworkJoin::list_all(client, &JoinTarget::Hypervisor(self.id)).await
    }

    /// Backup servers attached directly to this hypervisor.
    pub async fn backup_server_joins(
        &self,
        client: &OnAppClient,
    ) -> Result<Vec<BackupServerJoin>> {
        BackupServerJoin::list_all(client, &JoinTarget::Hypervisor(self.id)).await
    }

    /// Reboot the hypervisor.
    #[tracing::instrument(skip(client))]
    pub async fn reboot(client: &OnAppClient, id: u64) -> Result<()> {
        client
            .post_empty(&format!("{PATH}/{id}/reboot.json"))
            .await?;
        Ok(())
    }
}

/// Parameters for creating a hypervisor.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct HypervisorCreateParams {
    pub label: String,
    pub ip_address: String,
    pub hypervisor_type: String,
    pub hypervisor_group_id: Option<u64>,
    pub server_type: Option<String>,
    pub enabled: Option<bool>,
    pub backup: Option<bool>,
    pub backup_ip_address: Option<String>,
    pub collect_stats: Option<bool>,
    pub disable_failover: Option<bool>,
    pub format_disks: Option<bool>,
    pub passthrough_disks: Option<bool>,
    pub mac: Option<String>,
    pub cpu_units: Option<u32>,
    pub power_cycle_command: Option<String>,
}

/// Parameters for editing a hypervisor.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct HypervisorEditParams {
    pub label: Option<String>,
    pub ip_address: Option<String>,
    pub hypervisor_group_id: Option<u64>,
    pub enabled: Option<bool>,
    pub backup: Option<bool>,
    pub backup_ip_address: Option<String>,
    pub collect_stats: Option<bool>,
    pub disable_failover: Option<bool>,
    pub cpu_units: Option<u32>,
    pub power_cycle_command: Option<String>,
}

impl Resource for Hypervisor {
    const KEY: &'static str = "hypervisor";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Hypervisor {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Hypervisor {
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
impl Create for Hypervisor {
    type Scope = ();
    type Params = HypervisorCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for Hypervisor {
    type Id = u64;
    type Params = HypervisorEditParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for Hypervisor {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypervisor_deserialize() {
        let json = r#"{
            "hypervisor": {
                "id": 12,
                "label": "hv-kvm-01",
                "ip_address": "10.0.50.3",
                "hypervisor_type": "kvm",
                "hypervisor_group_id": 2,
                "server_type": "virtual",
                "enabled": true,
                "online": true,
                "locked": false,
                "spare": false,
                "backup": false,
                "host_id": 3,
                "mac": "00:1e:67:2b:9a:10",
                "cpus": 32,
                "cpu_cores": 16,
                "cpu_mhz": 2400,
                "total_memory": 128000,
                "free_memory": 96000,
                "failure_count": 0,
                "disable_failover": false,
                "called_in_at": "2024-05-01T10:15:00.000+00:00",
                "created_at": "2023-01-19T22:38:02.000+00:00",
                "updated_at": "2024-05-01T10:15:00.000+00:00",
                "connection_options": {"api_url": null}
            }
        }"#;

        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        let hv: Hypervisor = crate::envelope::unwrap_one(Hypervisor::KEY, value).unwrap();

        assert_eq!(hv.id, 12);
        assert_eq!(hv.label, "hv-kvm-01");
        assert_eq!(hv.hypervisor_type.as_deref(), Some("kvm"));
        assert_eq!(hv.hypervisor_group_id, Some(2));
        assert_eq!(hv.used_memory(), Some(32000));
        assert!(hv.is_available());
        assert!(hv.called_in_at.is_some());
    }

    #[test]
    fn test_hypervisor_deserialize_minimal() {
        let hv: Hypervisor = serde_json::from_str(r#"{"id": 1, "label": "bare"}"#).unwrap();
        assert!(!hv.is_available());
        assert_eq!(hv.used_memory(), None);
        assert_eq!(hv.failure_count, 0);
    }

    #[test]
    fn test_create_params_skip_unset() {
        let params = HypervisorCreateParams {
            label: "hv".to_string(),
            ip_address: "10.0.0.2".to_string(),
            hypervisor_type: "kvm".to_string(),
            enabled: Some(true),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "label": "hv",
                "ip_address": "10.0.0.2",
                "hypervisor_type": "kvm",
                "enabled": true
            })
        );
    }

    #[test]
    fn test_edit_params_empty() {
        let value = serde_json::to_value(HypervisorEditParams::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
