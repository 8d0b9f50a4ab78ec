//! IP net model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::models::ip_range::IpRange;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// A subnet configured on a network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpNet {
    pub id: u64,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub network_address: Option<String>,

    /// Prefix length.
    #[serde(default)]
    pub network_mask: Option<u8>,

    /// 4 or 6.
    #[serde(default)]
    pub ip_version: Option<u8>,

    #[serde(default)]
    pub network_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IpNet {
    /// CIDR notation, when both parts are known.
    pub fn cidr(&self) -> Option<String> {
        Some(format!(
            "{}/{}",
            self.network_address.as_deref()?,
            self.network_mask?
        ))
    }

    /// Ranges inside this net. `network_id` must be known.
    pub async fn ip_ranges(&self, client: &OnAppClient, network_id: u64) -> Result<Vec<IpRange>> {
        IpRange::list_all(client, &(network_id, self.id)).await
    }
}

/// Parameters for creating or editing an IP net.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpNetParams {
    pub label: Option<String>,
    pub network_address: Option<String>,
    pub network_mask: Option<u8>,
    pub ip_version: Option<u8>,
    /// Create a range spanning the whole net.
    pub add_default_ip_range: Option<bool>,
}

fn nets_path(network_id: u64) -> String {
    format!("settings/networks/{network_id}/ip_nets")
}

impl Resource for IpNet {
    const KEY: &'static str = "ip_net";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for IpNet {
    /// (network id, ip net id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", nets_path(network_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for IpNet {
    /// The network id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        network_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", nets_path(*network_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for IpNet {
    type Scope = u64;
    type Params = IpNetParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, network_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("{}.json", nets_path(network_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for IpNet {
    type Id = (u64, u64);
    type Params = IpNetParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64), params: Self::Params) -> Result<()> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", nets_path(network_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for IpNet {
    type Id = (u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64), options: NoOptions) -> Result<()> {
        let (network_id, id) = id;
        let path = format!("{}/{id}.json", nets_path(network_id));
        client.remove(&path, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_net_cidr() {
        let net: IpNet = serde_json::from_value(serde_json::json!({
            "id": 9,
            "label": "public v4",
            "network_address": "192.0.2.0",
            "network_mask": 24,
            "ip_version": 4
        }))
        .unwrap();
        assert_eq!(net.cidr().as_deref(), Some("192.0.2.0/24"));
    }

    #[test]
    fn test_ip_net_cidr_unknown() {
        let net: IpNet = serde_json::from_value(serde_json::json!({"id": 9})).unwrap();
        assert!(net.cidr().is_none());
    }
}
