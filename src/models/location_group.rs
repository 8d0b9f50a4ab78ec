//! Location group model. Read-only through the API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::OnAppClient;
use crate::envelope::{collection_path, item_path};
use crate::error::Result;
use crate::pagination::{ListOptions, Page};
use crate::traits::{Get, List, Resource};

const PATH: &str = "settings/location_groups";

/// A physical location zones are assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationGroup {
    pub id: u64,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub federated: bool,

    #[serde(default)]
    pub cdn_enabled: bool,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationGroup {
    /// "City, Country", or whichever part is known.
    pub fn display_name(&self) -> String {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => format!("{city}, {country}"),
            (Some(part), None) | (None, Some(part)) => part.to_string(),
            (None, None) => format!("location {}", self.id),
        }
    }
}

impl Resource for LocationGroup {
    const KEY: &'static str = "location_group";

    fn id(&self) -> u64 {
        self.id
    }
}

#[async_trait]
impl Get for LocationGroup {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OnAppClient, id: u64) -> Result<Self> {
        client.fetch(&item_path(PATH, id), Self::KEY).await
    }
}

#[async_trait]
impl List for LocationGroup {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let lg: LocationGroup = serde_json::from_value(serde_json::json!({
            "id": 1, "city": "London", "country": "United Kingdom"
        }))
        .unwrap();
        assert_eq!(lg.display_name(), "London, United Kingdom");

        let lg: LocationGroup = serde_json::from_value(serde_json::json!({"id": 2})).unwrap();
        assert_eq!(lg.display_name(), "location 2");
    }
}
