//! IP range model and trait implementations.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// An allocatable address range inside an IP net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRange {
    pub id: u64,

    pub start_address: String,

    pub end_address: String,

    #[serde(default)]
    pub default_gateway: Option<String>,

    #[serde(default)]
    pub ip_version: Option<u8>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl IpRange {
    /// Whether `address` lies between the start and end addresses.
    ///
    /// Returns false when any of the addresses fails to parse or the
    /// address families differ.
    pub fn contains(&self, address: &str) -> bool {
        let parse = |s: &str| s.parse::<IpAddr>().ok();
        match (
            parse(&self.start_address),
            parse(&self.end_address),
            parse(address),
        ) {
            (Some(IpAddr::V4(start)), Some(IpAddr::V4(end)), Some(IpAddr::V4(addr))) => {
                (start..=end).contains(&addr)
            }
            (Some(IpAddr::V6(start)), Some(IpAddr::V6(end)), Some(IpAddr::V6(addr))) => {
                (start..=end).contains(&addr)
            }
            _ => false,
        }
    }
}

/// Parameters for creating or editing an IP range.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpRangeParams {
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub default_gateway: Option<String>,
}

fn ranges_path(network_id: u64, ip_net_id: u64) -> String {
    format!("settings/networks/{network_id}/ip_nets/{ip_net_id}/ip_ranges")
}

impl Resource for IpRange {
    const KEY: &'static str = "ip_range";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for IpRange {
    /// (network id, ip net id, range id)
    type Id = (u64, u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64, u64)) -> Result<Self> {
        let (network_id, ip_net_id, id) = id;
        let path = format!("{}/{id}.json", ranges_path(network_id, ip_net_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for IpRange {
    /// (network id, ip net id)
    type Query = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        query: &(u64, u64),
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let (network_id, ip_net_id) = *query;
        let path = format!("{}.json", ranges_path(network_id, ip_net_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for IpRange {
    type Scope = (u64, u64);
    type Params = IpRangeParams;

    #[tracing::instrument(skip(client))]
    async fn create(
        client: &OnAppClient,
        scope: (u64, u64),
        params: Self::Params,
    ) -> Result<Self> {
        let (network_id, ip_net_id) = scope;
        let path = format!("{}.json", ranges_path(network_id, ip_net_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for IpRange {
    type Id = (u64, u64, u64);
    type Params = IpRangeParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64, u64), params: Self::Params) -> Result<()> {
        let (network_id, ip_net_id, id) = id;
        let path = format!("{}/{id}.json", ranges_path(network_id, ip_net_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for IpRange {
    type Id = (u64, u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64, u64), options: NoOptions) -> Result<()> {
        let (network_id, ip_net_id, id) = id;
        let path = format!("{}/{id}.json", ranges_path(network_id, ip_net_id));
        client.remove(&path, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> IpRange {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "start_address": start,
            "end_address": end
        }))
        .unwrap()
    }

    #[test]
    fn test_range_contains_v4() {
        let r = range("192.0.2.10", "192.0.2.20");
        assert!(r.contains("192.0.2.10"));
        assert!(r.contains("192.0.2.15"));
        assert!(r.contains("192.0.2.20"));
        assert!(!r.contains("192.0.2.21"));
        assert!(!r.contains("2001:db8::1"));
    }

    #[test]
    fn test_range_contains_v6() {
        let r = range("2001:db8::1", "2001:db8::ff");
        assert!(r.contains("2001:db8::10"));
        assert!(!r.contains("2001:db8::100"));
    }

    #[test]
    fn test_range_contains_garbage() {
        assert!(!range("x", "y").contains("192.0.2.1"));
    }
}
