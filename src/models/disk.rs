//! Disk model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::item_path;
use crate::error::Result;
use crate::models::backup::Backup;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "settings/disks";

/// A virtual machine disk.
///
/// Disks are listed and created under their virtual machine but addressed
/// directly by id everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disk {
    pub id: u64,

    #[serde(default)]
    pub label: Option<String>,

    /// Size in GB.
    pub disk_size: u64,

    #[serde(default)]
    pub data_store_id: Option<u64>,

    #[serde(default)]
    pub virtual_machine_id: Option<u64>,

    #[serde(default)]
    pub primary: bool,

    #[serde(default)]
    pub is_swap: bool,

    #[serde(default)]
    pub mount_point: Option<String>,

    #[serde(default)]
    pub file_system: Option<String>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default)]
    pub built: bool,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub has_autobackups: bool,

    #[serde(default)]
    pub min_iops: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Disk {
    /// Backups taken of this disk.
    #[tracing::instrument(skip(self, client), fields(disk = self.id))]
    pub async fn backups(&self, client: &OnAppClient) -> Result<Vec<Backup>> {
        let path = format!("{PATH}/{}/backups.json", self.id);
        client
            .fetch_list(&path, Backup::KEY, &ListOptions::default())
            .await
    }
}

/// Parameters for creating or editing a disk.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskParams {
    pub label: Option<String>,
    pub disk_size: Option<u64>,
    pub data_store_id: Option<u64>,
    pub is_swap: Option<bool>,
    pub mount_point: Option<String>,
    pub file_system: Option<String>,
    pub require_format_disk: Option<bool>,
    pub add_to_linux_fstab: Option<bool>,
    pub min_iops: Option<u64>,
}

impl Resource for Disk {
    const KEY: &'static str = "disk";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for Disk {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for Disk {
    /// The virtual machine id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        vm_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("virtual_machines/{vm_id}/disks.json");
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for Disk {
    /// The virtual machine id.
    type Scope = u64;
    type Params = DiskParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, vm_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("virtual_machines/{vm_id}/disks.json");
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for Disk {
    type Id = u64;
    type Params = DiskParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for Disk {
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
    fn test_disk_deserialize() {
        let disk: Disk = serde_json::from_value(serde_json::json!({
            "id": 40,
            "label": "Disk 1",
            "disk_size": 20,
            "data_store_id": 7,
            "virtual_machine_id": 101,
            "primary": true,
            "is_swap": false,
            "mount_point": "/",
            "file_system": "ext4",
            "built": true,
            "locked": false
        }))
        .unwrap();
        assert!(disk.primary);
        assert_eq!(disk.disk_size, 20);
        assert_eq!(disk.file_system.as_deref(), Some("ext4"));
    }
}
