//! IP address model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// An address in a network's pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddress {
    pub id: u64,

    pub address: String,

    #[serde(default)]
    pub prefix: Option<u8>,

    #[serde(default)]
    pub broadcast: Option<String>,

    #[serde(default)]
    pub network_address: Option<String>,

    #[serde(default)]
    pub gateway: Option<String>,

    /// Whether the address is unassigned.
    #[serde(default)]
    pub free: bool,

    #[serde(default)]
    pub network_id: Option<u64>,

    #[serde(default)]
    pub ip_range_id: Option<u64>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub hypervisor_id: Option<u64>,

    /// Addresses that may not be used as a VM's primary address.
    #[serde(default)]
    pub disallowed_primary: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing an IP address.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpAddressParams {
    pub address: Option<String>,
    pub prefix: Option<u8>,
    pub broadcast: Option<String>,
    pub network_address: Option<String>,
    pub gateway: Option<String>,
    pub user_id: Option<u64>,
    pub hypervisor_id: Option<u64>,
    pub disallowed_primary: Option<bool>,
}

fn addresses_path(network_id: u64) -> String {
    format!("settings/networks/{network_id}/ip_addresses")
}

impl Resource for IpAddress {
    const KEY: &'static str = "ip_address";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for IpAddress {
    /// (network id, address id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", addresses_path(network_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for IpAddress {
    /// The network id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        network_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", addresses_path(*network_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for IpAddress {
    type Scope = u64;
    type Params = IpAddressParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, network_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("{}.json", addresses_path(network_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for IpAddress {
    type Id = (u64, u64);
    type Params = IpAddressParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64), params: Self::Params) -> Result<()> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", addresses_path(network_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for IpAddress {
    type Id = (u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64), options: NoOptions) -> Result<()> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", addresses_path(network_id));
        client.remove(&path, &options).await
    }
}
