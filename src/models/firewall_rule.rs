//! Firewall rule model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// What a firewall rule does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FirewallCommand {
    Accept,
    Drop,
}

/// A per-interface firewall rule of a virtual machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallRule {
    pub id: u64,

    pub command: FirewallCommand,

    /// Source address or CIDR; empty matches everything.
    #[serde(default)]
    pub address: Option<String>,

    /// Port or port range (e.g. "22", "8000:8100").
    #[serde(default)]
    pub port: Option<String>,

    /// "TCP", "UDP" or "ICMP".
    #[serde(default)]
    pub protocol: Option<String>,

    #[serde(default)]
    pub network_interface_id: Option<u64>,

    #[serde(default)]
    pub position: Option<u32>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FirewallRule {
    /// Push the saved rules of a virtual machine to its hypervisor.
    ///
    /// Rule changes take effect only after this call.
    #[tracing::instrument(skip(client))]
    pub async fn apply(client: &OnAppClient, vm_id: u64) -> Result<()> {
        client
            .post_empty(&format!("virtual_machines/{vm_id}/update_firewall_rules.json"))
            .await?;
        Ok(())
    }
}

/// Parameters for creating or editing a firewall rule.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct FirewallRuleParams {
    pub command: Option<FirewallCommand>,
    pub network_interface_id: Option<u64>,
    pub address: Option<String>,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub position: Option<u32>,
}

fn rules_path(vm_id: u64) -> String {
    format!("virtual_machines/{vm_id}/firewall_rules")
}

impl Resource for FirewallRule {
    const KEY: &'static str = "firewall_rule";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for FirewallRule {
    /// (virtual machine id, rule id)
    type Id = (u64, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (u64, u64)) -> Result<Self> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", rules_path(vm_id));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for FirewallRule {
    /// The virtual machine id.
    type Query = u64;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        vm_id: &u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", rules_path(*vm_id));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for FirewallRule {
    type Scope = u64;
    type Params = FirewallRuleParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OnAppClient, vm_id: u64, params: Self::Params) -> Result<Self> {
        let path = format!("{}.json", rules_path(vm_id));
        client.create(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Edit for FirewallRule {
    type Id = (u64, u64);
    type Params = FirewallRuleParams;

    #[tracing::instrument(skip(client))]
    async fn edit(client: &OnAppClient, id: (u64, u64), params: Self::Params) -> Result<()> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", rules_path(vm_id));
        client.edit(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for FirewallRule {
    type Id = (u64, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &OnAppClient, id: (u64, u64), options: NoOptions) -> Result<()> {
        let (vm_id, id) = id;
        let path = format!("{}/{id}.json", rules_path(vm_id));
        client.remove(&path, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firewall_rule_deserialize() {
        let rule: FirewallRule = serde_json::from_value(serde_json::json!({
            "id": 8,
            "command": "DROP",
            "address": "",
            "port": "22",
            "protocol": "TCP",
            "network_interface_id": 14,
            "position": 1
        }))
        .unwrap();
        assert_eq!(rule.command, FirewallCommand::Drop);
        assert_eq!(rule.port.as_deref(), Some("22"));
    }

    #[test]
    fn test_firewall_params_serialize_command() {
        let params = FirewallRuleParams {
            command: Some(FirewallCommand::Accept),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            serde_json::json!({"command": "ACCEPT", "protocol": "TCP"})
        );
    }
}
