//! Image template group (template store folder) model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/image_template_groups";

/// A folder in the template store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTemplateGroup {
    pub id: u64,

    pub label: String,

    /// Parent group for nested folders.
    #[serde(default)]
    pub parent_id: Option<u64>,

    /// Windows licensing: "mak", "kms" or "own".
    #[serde(default)]
    pub kms_type: Option<String>,

    #[serde(default)]
    pub kms_server_label: Option<String>,

    #[serde(default)]
    pub kms_host: Option<String>,

    #[serde(default)]
    pub kms_port: Option<u16>,

    #[serde(default)]
    pub system_group: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing a template group.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageTemplateGroupParams {
    pub label: Option<String>,
    pub parent_id: Option<u64>,
    pub kms_type: Option<String>,
    pub kms_server_label: Option<String>,
    pub kms_host: Option<String>,
    pub kms_port: Option<u16>,
}

impl Resource for ImageTemplateGroup {
    const KEY: &'static str = "image_template_group";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for ImageTemplateGroup {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for ImageTemplateGroup {
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
impl Create for ImageTemplateGroup {
    type Scope = ();
    type Params = ImageTemplateGroupParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for ImageTemplateGroup {
    type Id = u64;
    type Params = ImageTemplateGroupParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for ImageTemplateGroup {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}
