//! SSH key model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::OnAppClient;
use crate::envelope::item_path;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Get, List, NoOptions, Resource};

const PATH: &str = "settings/ssh_keys";

/// A public key installed on a user's virtual machines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKey {
    pub id: u64,

    pub key: String,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SshKey {
    /// Key type prefix, e.g. "ssh-ed25519".
    pub fn key_type(&self) -> Option<&str> {
        self.key.split_whitespace().next()
    }

    /// Trailing comment of the key, usually `user@host`.
    pub fn comment(&self) -> Option<&str> {
        self.key.split_whitespace().nth(2)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SshKeyParams {
    pub key: String,
}

impl Resource for SshKey {
    const KEY: &'static str = "ssh_key";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for SshKey {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for SshKey {
    /// The owning user id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        user_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("users/{user_id}/ssh_keys.json");
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for SshKey {
    /// The owning user id.
    type Scope = u64;
    type Params = SshKeyParams;

    #[tracing::instrument(skip(client, params))]
    async fn create(client: &OnAppClient, user_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("users/{user_id}/ssh_keys.json");
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for SshKey {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_key_parts() {
        let key: SshKey = serde_json::from_value(serde_json::json!({
            "id": 4,
            "key": "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIO2 ops@bastion",
            "user_id": 12
        }))
        .unwrap();
        assert_eq!(key.key_type(), Some("ssh-ed25519"));
        assert_eq!(key.comment(), Some("ops@bastion"));
    }
}
