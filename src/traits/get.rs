//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::OnAppClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Nested resources use a tuple id carrying the parent ids, e.g.
/// `(virtual_machine_id, network_interface_id)`.
///
/// # Example
///
/// ```ignore
/// use onapp::{OnAppClient, Hypervisor, Get};
///
/// let client = OnAppClient::from_env()?;
/// let hv = Hypervisor::get(&client, 12).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &OnAppClient, id: Self::Id) -> Result<Self>;
}
