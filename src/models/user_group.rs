//! User group model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::models::user::RoleEntry;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "user_groups";

/// A group of users sharing roles and billing plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub billing_plan_id: Option<u64>,

    #[serde(default)]
    pub roles: Vec<RoleEntry>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing a user group.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserGroupParams {
    pub label: Option<String>,
    pub billing_plan_id: Option<u64>,
    pub role_ids: Option<Vec<u64>>,
}

impl Resource for UserGroup {
    const KEY: &'static str = "user_group";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for UserGroup {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for UserGroup {
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
impl Create for UserGroup {
    type Scope = ();
    type Params = UserGroupParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for UserGroup {
    type Id = u64;
    type Params = UserGroupParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for UserGroup {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}
