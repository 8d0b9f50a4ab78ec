//! User white list (allowed login addresses) model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// An address a user is allowed to log in from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWhiteList {
    pub id: u64,

    pub ip: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parameters for creating or editing a white list entry.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserWhiteListParams {
    pub ip: Option<String>,
    pub description: Option<String>,
}

fn collection(user_id: u64) -> String {
    format!("users/{user_id}/user_white_lists")
}

impl Resource for UserWhiteList {
    const KEY: &'static str = "user_white_list";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for UserWhiteList {
    /// (user id, entry id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (user_id, id) = id;
        let path = format!("{}/{id}.json", collection(user_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for UserWhiteList {
    /// The owning user id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        user_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", collection(*user_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for UserWhiteList {
    /// The owning user id.
    type Scope = u64;
    type Params = UserWhiteListParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, user_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("{}.json", collection(user_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for UserWhiteList {
    /// (user id, entry id)
    type Id = (u64, u64);
    type Params = UserWhiteListParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64), params: Self::Params) -> Result<()> {
        let (user_id, id) = id;
        let path = format!("{}/{id}.json", collection(user_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for UserWhiteList {
    /// (user id, entry id)
    type Id = (u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64), options: NoOptions) -> Result<()> {
        let (user_id, id) = id;
        let path = format!("{}/{id}.json", collection(user_id));
        client.remove(&path, &options).await
    }
}
