//! Network model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::models::ip_address::IpAddress;
use crate::models::ip_net::IpNet;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/networks";

/// A layer 2 network virtual machines attach to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub vlan: Option<u32>,

    /// The network zone this network belongs to.
    #[serde(default)]
    pub network_group_id: Option<u64>,

    /// Owner, for user-scoped networks.
    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default, rename = "type")]
    pub network_type: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Network {
    /// IP nets configured on this network.
    pub async fn ip_nets(&self, client: &OnAppClient) -> Result<Vec<IpNet>> {
        IpNet::list_all(client, &self.id).await
    }

    /// IP addresses belonging to this network.
    pub async fn ip_addresses(&self, client: &OnAppClient) -> Result<Vec<IpAddress>> {
        IpAddress::list_all(client, &self.id).await
    }
}

/// Parameters for creating or editing a network.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkParams {
    pub label: Option<String>,
    pub vlan: Option<u32>,
    pub network_group_id: Option<u64>,
    pub identifier: Option<String>,
}

impl Resource for Network {
    const KEY: &'static str = "network";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Network {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Network {
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
impl Create for Network {
    type Scope = ();
    type Params = NetworkParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for Network {
    type Id = u64;
    type Params = NetworkParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for Network {
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
    fn test_network_deserialize_type_field() {
        let net: Network = serde_json::from_value(serde_json::json!({
            "id": 3,
            "label": "Public",
            "identifier": "n3k2m1",
            "vlan": 120,
            "network_group_id": 4,
            "type": "Networking::Network"
        }))
        .unwrap();
        assert_eq!(net.vlan, Some(120));
        assert_eq!(net.network_type.as_deref(), Some("Networking::Network"));
    }
}
