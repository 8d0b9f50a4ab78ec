//! Hypervisor zone (compute zone) model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::models::data_store_join::DataStoreJoin;
use crate::models::hypervisor::Hypervisor;
use crate::models::network_join::NetworkJoin;
use crate::models::target::JoinTarget;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/hypervisor_zones";

/// A group of hypervisors sharing data stores, networks and backup servers.
///
/// The API calls these "hypervisor groups" in payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypervisorZone {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub location_group_id: Option<u64>,

    /// Server type (e.g., "virtual", "baremetal", "smart").
    #[serde(default)]
    pub server_type: Option<String>,

    /// Closed zones accept no new virtual machines.
    #[serde(default)]
    pub closed: bool,

    /// Minutes before failover kicks in.
    #[serde(default)]
    pub failover_timeout: Option<u32>,

    #[serde(default)]
    pub cpu_flags_enabled: bool,

    #[serde(default)]
    pub release_resource_type: Option<String>,

    #[serde(default)]
    pub run_sysprep: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HypervisorZone {
    /// Hypervisors assigned to this zone.
    #[tracing::instrument(skip(self, client), fields(zone = self.id))]
    pub async fn hypervisors(&self, client: &OnAppClient) -> Result<Vec<Hypervisor>> {
        let path = format!("{PATH}/{}/hypervisors.json", self.id);
        client
            .fetch_list(&path, Hypervisor::KEY, &ListOptions::default())
            .await
    }

    /// Data stores joined to this zone.
    pub async fn data_store_joins(&self, client: &OnAppClient) -> Result<Vec<DataStoreJoin>> {
        DataStoreJoin::list_all(client, &JoinTarget::HypervisorZone(self.id)).await
    }

    /// Networks joined to this zone.
    pub async fn network_joins(&self, client: &OnAppClient) -> Result<Vec<NetworkJoin>> {
        NetworkJoin::list_all(client, &JoinTarget::HypervisorZone(self.id)).await
    }
}

/// Parameters for creating or editing a hypervisor zone.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct HypervisorZoneParams {
    pub label: Option<String>,
    pub location_group_id: Option<u64>,
    pub server_type: Option<String>,
    pub closed: Option<bool>,
    pub failover_timeout: Option<u32>,
    pub cpu_flags_enabled: Option<bool>,
    pub release_resource_type: Option<String>,
    pub run_sysprep: Option<bool>,
}

impl Resource for HypervisorZone {
    const KEY: &'static str = "hypervisor_group";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for HypervisorZone {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for HypervisorZone {
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
impl Create for HypervisorZone {
    type Scope = ();
    type Params = HypervisorZoneParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for HypervisorZone {
    type Id = u64;
    type Params = HypervisorZoneParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for HypervisorZone {
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
    fn test_hypervisor_zone_deserialize() {
        let json = serde_json::json!({
            "hypervisor_group": {
                "id": 2,
                "label": "Compute Zone A",
                "location_group_id": 5,
                "server_type": "virtual",
                "closed": false,
                "failover_timeout": 5,
                "cpu_flags_enabled": true,
                "release_resource_type": "memory_guarantee",
                "run_sysprep": true,
                "created_at": "2022-06-01T09:00:00.000Z"
            }
        });
        let zone: HypervisorZone = crate::envelope::unwrap_one(HypervisorZone::KEY, json).unwrap();
        assert_eq!(zone.id, 2);
        assert_eq!(zone.location_group_id, Some(5));
        assert!(zone.cpu_flags_enabled);
        assert_eq!(zone.release_resource_type.as_deref(), Some("memory_guarantee"));
    }
}
