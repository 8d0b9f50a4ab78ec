//! Data store, network and backup server zones.
//!
//! The three zone kinds share one representation and differ only in their
//! endpoint and envelope key, so they are a single generic [`Zone`] type
//! parameterised by a marker.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// Endpoint metadata for a zone kind.
pub trait ZoneKind: Debug + Clone + Send + Sync + 'static {
    /// Envelope key (e.g. `"data_store_group"`).
    const KEY: &'static str;
    /// Collection path (e.g. `"settings/data_store_zones"`).
    const PATH: &'static str;
}

/// Marker for data store zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataStoreZoneKind;

impl ZoneKind for DataStoreZoneKind {
    const KEY: &'static str = "data_store_group";
    const PATH: &'static str = "settings/data_store_zones";
}

/// Marker for network zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkZoneKind;

impl ZoneKind for NetworkZoneKind {
    const KEY: &'static str = "network_group";
    const PATH: &'static str = "settings/network_zones";
}

/// Marker for backup server zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupServerZoneKind;

impl ZoneKind for BackupServerZoneKind {
    const KEY: &'static str = "backup_server_group";
    const PATH: &'static str = "settings/backup_server_zones";
}

/// A zone grouping data stores, networks or backup servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Zone<K: ZoneKind> {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub location_group_id: Option<u64>,

    /// Server type (e.g., "virtual", "baremetal", "smart").
    #[serde(default)]
    pub server_type: Option<String>,

    /// Whether the zone is shared through federation.
    #[serde(default)]
    pub federation_enabled: bool,

    #[serde(default)]
    pub traded: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    kind: PhantomData<K>,
}

/// A data store zone.
pub type DataStoreZone = Zone<DataStoreZoneKind>;
/// A network zone.
pub type NetworkZone = Zone<NetworkZoneKind>;
/// A backup server zone.
pub type BackupServerZone = Zone<BackupServerZoneKind>;

/// Parameters for creating or editing a zone.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZoneParams {
    pub label: Option<String>,
    pub location_group_id: Option<u64>,
    pub server_type: Option<String>,
}

impl ZoneParams {
    /// Parameters carrying only a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

impl<K: ZoneKind> Resource for Zone<K> {
    const KEY: &'static str = K::KEY;

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl<K: ZoneKind> Get for Zone<K> {
    type Id = u64;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(K::PATH, id), K::KEY).await
    }
}

#[async_trait]
impl<K: ZoneKind> List for Zone<K> {
    type Query = ();

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn list_page(
        client: &OnAppClient,
        _query: &(),
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let params = ListOptions::for_page(page, per_page);
        let items = client
            .fetch_list(&collection_path(K::PATH), K::KEY, &params)
            .await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl<K: ZoneKind> Create for Zone<K> {
    type Scope = ();
    type Params = ZoneParams;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn create(client: &OnAppClient, _scope: (), params: ZoneParams) -> Result<Self> {
        client
            .create(&collection_path(K::PATH), K::KEY, &params)
            .await
    }
}

#[async_trait]
impl<K: ZoneKind> Edit for Zone<K> {
    type Id = u64;
    type Params = ZoneParams;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn edit(client: &OnAppClient, id: u64, params: ZoneParams) -> Result<()> {
        client.edit(&item_path(K::PATH, id), K::KEY, &params).await
    }
}

#[async_trait]
impl<K: ZoneKind> Delete for Zone<K> {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(K::PATH, id), &options).await
    }
}
