//! User and company billing plans.
//!
//! Both plan kinds share one representation under different endpoints,
//! so they are a single generic [`BillingPlan`] type.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Create, Delete, Edit, Get, List, NoOptions, Resource};

/// Endpoint metadata for a plan kind.
pub trait PlanKind: Debug + Clone + Send + Sync + 'static {
    const KEY: &'static str;
    const PATH: &'static str;
}

/// Marker for plans billed to individual users.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserPlanKind;

impl PlanKind for UserPlanKind {
    const KEY: &'static str = "user_plan";
    const PATH: &'static str = "billing/user/plans";
}

/// Marker for plans billed to companies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyPlanKind;

impl PlanKind for CompanyPlanKind {
    const KEY: &'static str = "company_plan";
    const PATH: &'static str = "billing/company/plans";
}

/// A billing plan: resource limits and prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BillingPlan<K: PlanKind> {
    pub id: u64,

    pub label: String,

    /// ISO 4217 code, e.g. "USD".
    #[serde(default)]
    pub currency_code: Option<String>,

    #[serde(default)]
    pub monthly_price: Option<f64>,

    #[serde(default)]
    pub show_price: bool,

    #[serde(default)]
    pub allows_mak: bool,

    #[serde(default)]
    pub allows_kms: bool,

    #[serde(default)]
    pub allows_own: bool,

    /// Set on plans shared through federation.
    #[serde(default)]
    pub associated_with_users: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip)]
    kind: PhantomData<K>,
}

pub type UserPlan = BillingPlan<UserPlanKind>;
pub type CompanyPlan = BillingPlan<CompanyPlanKind>;

impl<K: PlanKind> BillingPlan<K> {
    /// Duplicate a plan under a new id.
    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    pub async fn copy(client: &OnAppClient, id: u64) -> Result<Self> {
        let path = format!("{}/{id}/create_copy.json", K::PATH);
        let value: serde_json::Value = client.post_empty(&path).await?.json().await?;
        crate::envelope::unwrap_one(K::KEY, value)
    }
}

/// Parameters for creating or editing a plan.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingPlanParams {
    pub label: Option<String>,
    pub currency_code: Option<String>,
    pub monthly_price: Option<f64>,
    pub show_price: Option<bool>,
    pub allows_mak: Option<bool>,
    pub allows_kms: Option<bool>,
    pub allows_own: Option<bool>,
}

impl<K: PlanKind> Resource for BillingPlan<K> {
    const KEY: &'static str = K::KEY;

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl<K: PlanKind> Get for BillingPlan<K> {
    type Id = u64;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(K::PATH, id), K::KEY).await
    }
}

#[async_trait]
impl<K: PlanKind> List for BillingPlan<K> {
    type Query = ();

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn list_page(
        client: &OnAppClient,
        _query: &(),
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>> {
        let params = ListOptions::for_page(page, per_page);
        let items = client
            .fetch_list(&collection_path(K::PATH), K::KEY, &params)
            .await?;
        Ok(Page::new(items, page, per_page))
    }
}

#[async_trait]
impl<K: PlanKind> Create for BillingPlan<K> {
    type Scope = ();
    type Params = BillingPlanParams;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn create(client: &OnAppClient, _scope: (), params: BillingPlanParams) -> Result<Self> {
        client
            .create(&collection_path(K::PATH), K::KEY, &params)
            .await
    }
}

#[async_trait]
impl<K: PlanKind> Edit for BillingPlan<K> {
    type Id = u64;
    type Params = BillingPlanParams;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn edit(client: &OnAppClient, id: u64, params: BillingPlanParams) -> Result<()> {
        client.edit(&item_path(K::PATH, id), K::KEY, &params).await
    }
}

#[async_trait]
impl<K: PlanKind> Delete for BillingPlan<K> {
    type Id = u64;
    type Options = NoOptions;

    #[tracing::instrument(skip(client), fields(kind = K::KEY))]
    async fn delete(client: &OnAppClient, id: u64, options: NoOptions) -> Result<()> {
        client.remove(&item_path(K::PATH, id), &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_deserialize() {
        let json = serde_json::json!({
            "company_plan": {
                "id": 8,
                "label": "Reseller Gold",
                "currency_code": "EUR",
                "monthly_price": 49.0,
                "show_price": true
            }
        });
        let plan: CompanyPlan = crate::envelope::unwrap_one(CompanyPlan::KEY, json).unwrap();
        assert_eq!(plan.id, 8);
        assert_eq!(plan.currency_code.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_user_plan_rejects_company_envelope() {
        let json = serde_json::json!({"company_plan": {"id": 8, "label": "x"}});
        assert!(crate::envelope::unwrap_one::<UserPlan>(UserPlan::KEY, json).is_err());
    }
}
