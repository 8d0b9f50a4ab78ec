//! IP address assignment (join) model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope;
use crate::error::Result;
use crate::models::ip_address::IpAddress;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Get, List, Resource};

/// Assignment of an IP address to a virtual machine's network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddressJoin {
    pub id: u64,

    pub ip_address_id: u64,

    #[serde(default)]
    pub network_interface_id: Option<u64>,

    /// The assigned address, when the API embeds it.
    #[serde(default)]
    pub ip_address: Option<IpAddress>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IpAddressJoin {
    /// The assigned address as text, if embedded.
    pub fn address(&self) -> Option<&str> {
        self.ip_address.as_ref().map(|ip| ip.address.as_str())
    }
}

/// Parameters for assigning an address.
///
/// Leave `address` unset to let OnApp pick a free address from the
/// interface's network.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpAddressJoinParams {
    pub network_interface_id: u64,
    pub address: Option<String>,
    pub ip_net_id: Option<u64>,
    pub ip_range_id: Option<u64>,
    /// Allow an address that is already in use elsewhere.
    pub used_ip: Option<bool>,
}

/// Options for removing an assignment.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpAddressJoinDeleteOptions {
    /// Rebuild the network configuration of the VM afterwards.
    pub rebuild_network: Option<bool>,
}

fn joins_path(vm_id: u64) -> String {
    format!("virtual_machines/{vm_id}/ip_addresses")
}

impl Resource for IpAddressJoin {
    const KEY: &'static str = "ip_address_join";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for IpAddressJoin {
    /// (virtual machine id, join id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", joins_path(vm_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for IpAddressJoin {
    /// The virtual machine id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        vm_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", joins_path(*vm_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for IpAddressJoin {
    type Scope = u64;
    type Params = IpAddressJoinParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, vm_id: u64, params: Self::Params) -> Result<Self> {
        // The request is wrapped as "ip_address" while the response is a join.
        let body = envelope::wrap(IpAddress::KEY, &params)?;
        let path = format!("{}.json", joins_path(vm_id));
        client.create_raw(&path, Self::KEY, &body).await
    }
}

#[async_trait]
impl Delete for IpAddressJoin {
    type Id = (u64, u64);
    type Options = IpAddressJoinDeleteOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(
        client: &OnAppClient,
        id: (u64, u64),
        options: IpAddressJoinDeleteOptions,
    ) -> Result<()> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", joins_path(vm_id));
        client.remove(&path, &options).await
    }
}
