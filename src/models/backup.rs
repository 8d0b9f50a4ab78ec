//! Backup model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{self, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "backups";

/// A disk backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub id: u64,

    #[serde(default)]
    pub identifier: Option<String>,

    /// Whether the backup has been taken.
    #[serde(default)]
    pub built: bool,

    #[serde(default)]
    pub built_at: Option<DateTime<Utc>>,

    /// "normal" or "incremental".
    #[serde(default)]
    pub backup_type: Option<String>,

    /// Size in KB.
    #[serde(default)]
    pub backup_size: Option<u64>,

    #[serde(default)]
    pub backup_server_id: Option<u64>,

    #[serde(default)]
    pub disk_id: Option<u64>,

    /// "schedule", "manual" etc.
    #[serde(default)]
    pub initiated: Option<String>,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub note: Option<String>,

    #[serde(default)]
    pub operating_system: Option<String>,

    #[serde(default)]
    pub operating_system_distro: Option<String>,

    #[serde(default)]
    pub target_id: Option<u64>,

    /// "Disk" or "VirtualMachine".
    #[serde(default)]
    pub target_type: Option<String>,

    /// Template this backup was taken from.
    #[serde(default)]
    pub template_id: Option<u64>,

    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Backup {
    /// Whether the backup can be restored or converted.
    pub fn is_usable(&self) -> bool {
        self.built && !self.locked
    }

    /// Restore the backup onto its disk.
    #[tracing::instrument(skip(client))]
    pub async fn restore(client: &OnAppClient, id: u64) -> Result<()> {
        client
            .post_empty(&format!("{PATH}/{id}/restore.json"))
            .await?;
        Ok(())
    }

    /// Convert the backup into a custom image template.
    #[tracing::instrument(skip(client))]
    pub async fn convert(client: &OnAppClient, id: u64, params: ConvertParams) -> Result<()> {
        let body = envelope::wrap(Self::KEY, &params)?;
        client
            .post(&format!("{PATH}/{id}/convert.json"), &body)
            .await?;
        Ok(())
    }
}

/// Parameters for taking a backup.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupCreateParams {
    pub note: Option<String>,
    /// Forced creation even while the VM is running (Windows only).
    pub force_windows_backup: Option<bool>,
}

/// Parameters for editing a backup.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupEditParams {
    pub note: Option<String>,
}

/// Parameters for converting a backup to a template.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertParams {
    pub label: String,
    /// Minimum memory in MB for VMs built from the template.
    pub min_memory_size: Option<u64>,
    /// Minimum disk size in GB for VMs built from the template.
    pub min_disk_size: Option<u64>,
}

impl Resource for Backup {
    const KEY: &'static str = "backup";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Backup {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Backup {
    /// The virtual machine id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        vm_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("virtual_machines/{vm_id}/backups.json");
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for Backup {
    /// The disk id.
    type Scope = u64;
    type Params = BackupCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, disk_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("settings/disks/{disk_id}/backups.json");
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for Backup {
    type Id = u64;
    type Params = BackupEditParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for Backup {
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
    fn test_backup_deserialize() {
        let json = serde_json::json!({
            "backup": {
                "id": 77,
                "identifier": "b77xk2",
                "built": true,
                "built_at": "2024-03-01T02:00:00.000Z",
                "backup_type": "incremental",
                "backup_size": 1048576,
                "backup_server_id": 3,
                "initiated": "schedule",
                "locked": false,
                "note": "nightly",
                "target_id": 101,
                "target_type": "VirtualMachine"
            }
        });
        let backup: Backup = envelope::unwrap_one(Backup::KEY, json).unwrap();
        assert!(backup.is_usable());
        assert_eq!(backup.backup_type.as_deref(), Some("incremental"));
        assert_eq!(backup.target_id, Some(101));
    }

    #[test]
    fn test_locked_backup_unusable() {
        let backup: Backup =
            serde_json::from_value(serde_json::json!({"id": 1, "built": true, "locked": true}))
                .unwrap();
        assert!(!backup.is_usable());
    }
}
