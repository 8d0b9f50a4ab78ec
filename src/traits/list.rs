//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::OnAppClient;
use crate::error::Result;
use crate::pagination::Page;
use crate::traits::Resource;

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages to fetch (safety limit).
pub(crate) const MAX_PAGES: u32 = 1000;

/// List entities with pagination support.
///
/// # Example
///
/// ```ignore
/// use onapp::{OnAppClient, VirtualMachine, List};
///
/// let client = OnAppClient::from_env()?;
///
/// // Fetch a single page
/// let page = VirtualMachine::list_page(&client, &(), 1, 50).await?;
///
/// // Fetch all pages
/// let all = VirtualMachine::list_all(&client, &()).await?;
/// ```
#[async_trait]
pub trait List: Resource + Sized + Send {
    /// Parent ids or filters for the listing.
    type Query: Default + Send + Sync;

    /// List entities matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The OnApp API client
    /// * `query` - Parent ids or filters
    /// * `page` - Page number (1-indexed)
    /// * `per_page` - Number of items per page
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &OnAppClient,
        query: &Self::Query,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Self>>;

    /// List all entities matching the query (fetches all pages).
    ///
    /// Some OnApp endpoints ignore pagination and return the whole
    /// collection on every page; fetching stops when a page starts with the
    /// same entity as the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &OnAppClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut page = 1;
        let mut previous_first: Option<u64> = None;

        loop {
            let result = Self::list_page(client, query, page, DEFAULT_PAGE_SIZE).await?;
            let first = result.items.first().map(Resource::id);
            if page > 1 && first.is_some() && first == previous_first {
                tracing::debug!(page, "Endpoint ignores pagination, stopping");
                break;
            }
            previous_first = first;

            let has_more = result.has_more;
            all_items.extend(result.items);

            if !has_more {
                break;
            }
            page += 1;

            if page > MAX_PAGES {
                tracing::warn!(
                    "Reached pagination limit of {} pages, stopping",
                    MAX_PAGES
                );
                break;
            }
        }

        Ok(all_items)
    }
}
