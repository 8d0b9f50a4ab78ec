//! Role model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "roles";

/// A named set of permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,

    pub label: String,

    /// e.g. "admin", "user".
    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enveloped permission as embedded in a role payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub permission: Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: u64,

    /// e.g. "virtual_machines.create".
    pub identifier: String,

    #[serde(default)]
    pub label: Option<String>,
}

impl Role {
    /// Whether the role grants the permission with this identifier.
    pub fn has_permission(&self, identifier: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.permission.identifier == identifier)
    }
}

/// Parameters for creating or editing a role.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleParams {
    pub label: Option<String>,
    pub permission_ids: Option<Vec<u64>>,
}

impl Resource for Role {
    const KEY: &'static str = "role";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Role {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Role {
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
impl Create for Role {
    type Scope = ();
    type Params = RoleParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for Role {
    type Id = u64;
    type Params = RoleParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for Role {
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
    fn test_role_permissions() {
        let json = serde_json::json!({
            "role": {
                "id": 3,
                "label": "Support",
                "identifier": "support",
                "permissions": [
                    {"permission": {"id": 10, "identifier": "virtual_machines.read", "label": "See all VMs"}},
                    {"permission": {"id": 11, "identifier": "transactions.read"}}
                ]
            }
        });
        let role: Role = crate::envelope::unwrap_one(Role::KEY, json).unwrap();
        assert_eq!(role.permissions.len(), 2);
        assert!(role.has_permission("transactions.read"));
        assert!(!role.has_permission("virtual_machines.delete"));
    }
}
