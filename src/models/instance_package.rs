//! Instance package model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "instance_packages";

/// A predefined VM size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstancePackage {
    pub id: u64,

    pub label: String,

    pub cpus: u32,

    /// Memory in MB.
    pub memory: u64,

    /// Disk size in GB.
    pub disk_size: u64,

    /// Monthly bandwidth in GB.
    #[serde(default)]
    pub bandwidth: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing an instance package.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstancePackageParams {
    pub label: Option<String>,
    pub cpus: Option<u32>,
    pub memory: Option<u64>,
    pub disk_size: Option<u64>,
    pub bandwidth: Option<u64>,
}

impl Resource for InstancePackage {
    const KEY: &'static str = "instance_package";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for InstancePackage {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for InstancePackage {
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
impl Create for InstancePackage {
    type Scope = ();
    type Params = InstancePackageParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for InstancePackage {
    type Id = u64;
    type Params = InstancePackageParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for InstancePackage {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}
