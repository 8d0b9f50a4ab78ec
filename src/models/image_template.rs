//! Image template model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::item_path;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Delete, Edit, Get, List, NoOptions, Resource};

const PATH: &str = "templates";

/// An OS image virtual machines are built from.
///
/// Templates are installed from the template store or converted from
/// backups rather than created directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTemplate {
    pub id: u64,

    pub label: String,

    #[serde(default)]
    pub file_name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// e.g. "active", "inactive".
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub operating_system: Option<String>,

    #[serde(default)]
    pub operating_system_distro: Option<String>,

    #[serde(default)]
    pub operating_system_arch: Option<String>,

    #[serde(default)]
    pub operating_system_edition: Option<String>,

    /// Minimum primary disk size in GB.
    #[serde(default)]
    pub min_disk_size: Option<u64>,

    /// Minimum memory in MB.
    #[serde(default)]
    pub min_memory_size: Option<u64>,

    /// Hypervisor types the template supports.
    #[serde(default)]
    pub virtualization: Vec<String>,

    #[serde(default)]
    pub allowed_swap: bool,

    #[serde(default)]
    pub allowed_hot_migrate: bool,

    #[serde(default)]
    pub allow_resize_without_reboot: bool,

    #[serde(default)]
    pub backup_server_id: Option<u64>,

    #[serde(default)]
    pub checksum: Option<String>,

    /// Size in KB.
    #[serde(default)]
    pub template_size: Option<u64>,

    /// Owner of a custom template.
    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ImageTemplate {
    /// Whether VMs on a hypervisor of the given type can use this template.
    pub fn supports(&self, hypervisor_type: &str) -> bool {
        self.virtualization
            .iter()
            .any(|v| v.eq_ignore_ascii_case(hypervisor_type))
    }

    /// Whether the template belongs to a user rather than the system.
    pub fn is_custom(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Parameters for editing an image template.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImageTemplateEditParams {
    pub label: Option<String>,
    pub min_disk_size: Option<u64>,
    pub min_memory_size: Option<u64>,
    pub allowed_swap: Option<bool>,
    pub allowed_hot_migrate: Option<bool>,
    pub allow_resize_without_reboot: Option<bool>,
}

impl Resource for ImageTemplate {
    const KEY: &'static str = "image_template";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for ImageTemplate {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for ImageTemplate {
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
            .fetch_list(&format!("{PATH}/all.json"), Self::KEY, &params)
            .await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Edit for ImageTemplate {
    type Id = u64;
    type Params = ImageTemplateEditParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: u64, params: Self::Params) -> Result<()> {
        client.edit(&item_path(PATH, id), Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for ImageTemplate {
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
    fn test_image_template_deserialize() {
        let tpl: ImageTemplate = serde_json::from_value(serde_json::json!({
            "id": 5,
            "label": "Ubuntu 22.04 x64",
            "file_name": "ubuntu-22.04-x64-1.0-kvm.kvm.tgz",
            "version": "1.0",
            "state": "active",
            "operating_system": "linux",
            "operating_system_distro": "ubuntu",
            "operating_system_arch": "x64",
            "min_disk_size": 5,
            "min_memory_size": 512,
            "virtualization": ["xen", "kvm"],
            "allowed_swap": true,
            "user_id": null
        }))
        .unwrap();
        assert!(tpl.supports("KVM"));
        assert!(!tpl.supports("vcenter"));
        assert!(!tpl.is_custom());
    }
}
