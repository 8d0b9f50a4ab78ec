//! Network interface model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// A virtual NIC of a virtual machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub id: u64,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub mac_address: Option<String>,

    /// The hypervisor network join the interface is plugged into.
    #[serde(default)]
    pub network_join_id: Option<u64>,

    #[serde(default)]
    pub primary: bool,

    /// Port speed in Mbps; 0 means unlimited.
    #[serde(default)]
    pub rate_limit: Option<u32>,

    #[serde(default)]
    pub connected: bool,

    #[serde(default)]
    pub virtual_machine_id: Option<u64>,

    /// "ACCEPT" or "DROP".
    #[serde(default)]
    pub default_firewall_rule: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing a network interface.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkInterfaceParams {
    pub label: Option<String>,
    pub network_join_id: Option<u64>,
    pub rate_limit: Option<u32>,
    pub primary: Option<bool>,
    pub default_firewall_rule: Option<String>,
}

fn interfaces_path(vm_id: u64) -> String {
    format!("virtual_machines/{vm_id}/network_interfaces")
}

impl Resource for NetworkInterface {
    const KEY: &'static str = "network_interface";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for NetworkInterface {
    /// (virtual machine id, interface id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", interfaces_path(vm_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for NetworkInterface {
    /// The virtual machine id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        vm_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", interfaces_path(*vm_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for NetworkInterface {
    type Scope = u64;
    type Params = NetworkInterfaceParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, vm_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("{}.json", interfaces_path(vm_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for NetworkInterface {
    type Id = (u64, u64);
    type Params = NetworkInterfaceParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64), params: Self::Params) -> Result<()> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", interfaces_path(vm_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for NetworkInterface {
    type Id = (u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64), options: NoOptions) -> Result<()> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", interfaces_path(vm_id));
        client.remove(&path, &options).await
    }
}
