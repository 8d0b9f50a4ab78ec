//! Data store model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/data_stores";

/// Storage backing virtual machine disks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStore {
    pub id: u64,

    pub label: String,

    /// Internal storage identifier.
    #[serde(default)]
    pub identifier: Option<String>,

    /// The data store zone this data store belongs to.
    #[serde(default)]
    pub data_store_group_id: Option<u64>,

    /// Capacity in GB.
    #[serde(default)]
    pub data_store_size: Option<u64>,

    /// Backend type (e.g., "lvm", "solidfire", "is").
    #[serde(default)]
    pub data_store_type: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    /// Set for data stores local to a single hypervisor.
    #[serde(default)]
    pub local_hypervisor_id: Option<u64>,

    #[serde(default)]
    pub ip: Option<String>,

    #[serde(default)]
    pub iops: Option<u64>,

    #[serde(default)]
    pub integrated_storage_cache_enabled: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DataStore {
    /// Whether the data store is attached to one hypervisor only.
    pub fn is_local(&self) -> bool {
        self.local_hypervisor_id.is_some()
    }
}

/// Parameters for creating or editing a data store.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataStoreParams {
    pub label: Option<String>,
    pub data_store_group_id: Option<u64>,
    pub data_store_size: Option<u64>,
    pub data_store_type: Option<String>,
    pub enabled: Option<bool>,
    pub local_hypervisor_id: Option<u64>,
    pub ip: Option<String>,
    pub iops: Option<u64>,
}

impl Resource for DataStore {
    const KEY: &'static str = "data_store";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for DataStore {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for DataStore {
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
impl Create for DataStore {
    type Scope = ();
    type Params = DataStoreParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for DataStore {
    type Id = u64;
    type Params = DataStoreParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for DataStore {
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
    fn test_data_store_deserialize() {
        let json = serde_json::json!({
            "data_store": {
                "id": 7,
                "label": "lvm-ds-1",
                "identifier": "ahd8w2kf0sl3qz",
                "data_store_group_id": 1,
                "data_store_size": 2048,
                "data_store_type": "lvm",
                "enabled": true,
                "local_hypervisor_id": null,
                "ip": "10.0.60.5",
                "iops": null
            }
        });
        let ds: DataStore = crate::envelope::unwrap_one(DataStore::KEY, json).unwrap();
        assert_eq!(ds.id, 7);
        assert_eq!(ds.data_store_size, Some(2048));
        assert!(!ds.is_local());
        assert!(ds.enabled);
    }
}
