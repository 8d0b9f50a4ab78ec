//! Backup server model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/backup_servers";

/// A server storing disk backups and templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupServer {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub ip_address: Option<String>,

    /// Address used for backup traffic, if separate.
    #[serde(default)]
    pub backup_ip_address: Option<String>,

    /// Capacity in GB.
    #[serde(default)]
    pub capacity: Option<u64>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub backup_server_group_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing a backup server.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupServerParams {
    pub label: Option<String>,
    pub ip_address: Option<String>,
    pub backup_ip_address: Option<String>,
    pub capacity: Option<u64>,
    pub enabled: Option<bool>,
    pub backup_server_group_id: Option<u64>,
}

impl Resource for BackupServer {
    const KEY: &'static str = "backup_server";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for BackupServer {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for BackupServer {
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
impl Create for BackupServer {
    type Scope = ();
    type Params = BackupServerParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for BackupServer {
    type Id = u64;
    type Params = BackupServerParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for BackupServer {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}
