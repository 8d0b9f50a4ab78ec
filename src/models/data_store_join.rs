//! Data store join model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::OnAppClient;
use crate::error::Result;
use crate::models::target::JoinTarget;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Get, List, NoOptions, Resource};

/// Attachment of a data store to a hypervisor or hypervisor zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataStoreJoin {
    pub id: u64,

    pub data_store_id: u64,

    #[serde(default)]
    pub target_join_id: Option<u64>,

    /// "Hypervisor" or "HypervisorGroup".
    #[serde(default)]
    pub target_join_type: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DataStoreJoin {
    /// The entity this join attaches the data store to.
    pub fn target(&self) -> Option<JoinTarget> {
        JoinTarget::from_parts(self.target_join_type.as_deref()?, self.target_join_id?)
    }
}

/// Parameters for joining a data store. Sent without an envelope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DataStoreJoinParams {
    pub data_store_id: u64,
}

fn joins_path(target: &JoinTarget) -> String {
    format!("{}/data_store_joins", target.path())
}

impl Resource for DataStoreJoin {
    const KEY: &'static str = "data_store_join";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for DataStoreJoin {
    type Id = (JoinTarget, u64);

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: (JoinTarget, u64)) -> Result<Self> {
        let (target, id) = id;
        let path = format!("{}/{id}.json", joins_path(&target));
        client.fetch(&path, Self::KEY).await
    }
}

#[async_trait]
impl List for DataStoreJoin {
    type Query = JoinTarget;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OnAppClient,
        target: &JoinTarget,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let path = format!("{}.json", joins_path(target));
        let params = ListOptions::for_page(page, per_page);
        let items = client.fetch_list(&path, Self::KEY, &params).await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl Create for DataStoreJoin {
    type Scope = JoinTarget;
    type Params = DataStoreJoinParams;

    #[tracing::instrument(skip(client))]
    async fn create(
        client: &OnAppClient,
        target: JoinTarget,
        params: Self::Params,
    ) -> Result<Self> {
        let path = format!("{}.json", joins_path(&target));
        client.create_raw(&path, Self::KEY, &params).await
    }
}

#[async_trait]
impl Delete for DataStoreJoin {
    type Id = (JoinTarget, u64);
    type Options = NoOptions;

    #[tracing::instrument(skip(client))]
    async fn delete(
        client: &OnAppClient,
        id: (JoinTarget, u64),
        options: NoOptions,
    ) -> Result<()> {
        let (target, id) = id;
        let path = format!("{}/{id}.json", joins_path(&target));
        client.remove(&path, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_store_join_target() {
        let join: DataStoreJoin = serde_json::from_value(serde_json::json!({
            "id": 31,
            "data_store_id": 7,
            "target_join_id": 2,
            "target_join_type": "HypervisorGroup"
        }))
        .unwrap();
        assert_eq!(join.target(), Some(JoinTarget::HypervisorZone(2)));
    }

    #[test]
    fn test_joins_path() {
        assert_eq!(
            joins_path(&JoinTarget::Hypervisor(5)),
            "settings/hypervisors/5/data_store_joins"
        );
    }
}
