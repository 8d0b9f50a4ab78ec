//! User model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, BoolFromInt};

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::models::role::Role;
use crate::models::ssh_key::SshKey;
use crate::models::user_white_list::UserWhiteList;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, Resource};

const PATH: &str = "users";

/// A control panel user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,

    pub login: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// "active", "suspended" or "deleted".
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub billing_plan_id: Option<u64>,

    #[serde(default)]
    pub user_group_id: Option<u64>,

    #[serde(default)]
    pub time_zone: Option<String>,

    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub roles: Vec<RoleEntry>,

    #[serde(default)]
    pub total_amount: Option<f64>,

    #[serde(default)]
    pub outstanding_amount: Option<f64>,

    #[serde(default)]
    pub used_cpus: Option<u64>,

    /// Used memory in MB.
    #[serde(default)]
    pub used_memory: Option<u64>,

    /// Used disk space in GB.
    #[serde(default)]
    pub used_disk_size: Option<u64>,

    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub suspend_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enveloped role as embedded in a user payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role: Role,
}

impl User {
    /// Full name when either part is known, the login otherwise.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.login.clone()
        } else {
            full
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.status.as_deref() == Some("suspended")
    }

    /// Role labels assigned to the user.
    pub fn role_labels(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.role.label.as_str()).collect()
    }

    /// Suspend the user, stopping all of their virtual machines.
    #[tracing::instrument(skip(client))]
    pub async fn suspend(client: &OnAppClient, id: u64) -> Result<User> {
        client
            .fetch(&format!("{PATH}/{id}/suspend.json"), Self::KEY)
            .await
    }

    /// Re-activate a suspended user.
    #[tracing::instrument(skip(client))]
    pub async fn activate(client: &OnAppClient, id: u64) -> Result<User> {
        client
            .fetch(&format!("{PATH}/{id}/activate_user.json"), Self::KEY)
            .await
    }

    /// SSH keys of this user.
    pub async fn ssh_keys(&self, client: &OnAppClient) -> Result<Vec<SshKey>> {
        SshKey::list_all(client, &self.id).await
    }

    /// IP addresses this user may log in from.
    pub async fn white_list(&self, client: &OnAppClient) -> Result<Vec<UserWhiteList>> {
        UserWhiteList::list_all(client, &self.id).await
    }
}

/// Parameters for creating a user.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserCreateParams {
    pub login: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_group_id: Option<u64>,
    pub billing_plan_id: Option<u64>,
    pub role_ids: Option<Vec<u64>>,
    pub time_zone: Option<String>,
    pub locale: Option<String>,
}

/// Parameters for editing a user.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserEditParams {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_group_id: Option<u64>,
    pub billing_plan_id: Option<u64>,
    pub role_ids: Option<Vec<u64>>,
    pub time_zone: Option<String>,
    pub locale: Option<String>,
}

/// Query options for deleting a user.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UserDeleteOptions {
    /// Erase the account immediately instead of marking it deleted.
    #[serde_as(as = "Option<BoolFromInt>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
}

impl Resource for User {
    const KEY: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for User {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for User {
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
impl Create for User {
    type Scope = ();
    type Params = UserCreateParams;

    #[tracing::instrument(skip(client, params), fields(login = %params.login))]
    async fn create(client: &OnAppClient, _scope: (), params: Self::Params) -> Result<Self> {
        client
            .create(&collection_path(PATH), Self::KEY, &params)
            .await
    }
}

#[async_trait]
impl Edit for User {
    type Id = u64;
    type Params = UserEditParams;

    #[tracing::instrument(skip(client, params))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for User {
    type Id = u64;
    type Options = UserDeleteOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: u64, options: UserDeleteOptions) -> Result<()> {
        client.remove(&item_path(PATH, id), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "user": {
                "id": 12,
                "login": "jdoe",
                "email": "jdoe@example.com",
                "first_name": "Jane",
                "last_name": "Doe",
                "status": "active",
                "billing_plan_id": 1,
                "user_group_id": 2,
                "time_zone": "UTC",
                "roles": [
                    {"role": {"id": 2, "label": "User", "identifier": "user"}}
                ],
                "total_amount": 12.5,
                "used_cpus": 4,
                "activated_at": "2023-01-10T08:00:00.000Z"
            }
        })
    }

    #[test]
    fn test_user_deserialize() {
        let user: User = crate::envelope::unwrap_one(User::KEY, sample()).unwrap();
        assert_eq!(user.id, 12);
        assert_eq!(user.display_name(), "Jane Doe");
        assert_eq!(user.role_labels(), vec!["User"]);
        assert!(!user.is_suspended());
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let user: User =
            serde_json::from_value(serde_json::json!({"id": 1, "login": "ops"})).unwrap();
        assert_eq!(user.display_name(), "ops");
    }

    #[test]
    fn test_create_params_skip_unset() {
        let params = UserCreateParams {
            login: "new".to_string(),
            email: "new@example.com".to_string(),
            password: "s3cret!Pass".to_string(),
            role_ids: Some(vec![2]),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "login": "new",
                "email": "new@example.com",
                "password": "s3cret!Pass",
                "role_ids": [2]
            })
        );
    }

    #[test]
    fn test_delete_options_force() {
        let opts = UserDeleteOptions { force: Some(true) };
        assert_eq!(serde_qs::to_string(&opts).unwrap(), "force=1");
    }
}
