//! Create trait for new entities.

use async_trait::async_trait;

use crate::client::OnAppClient;
use crate::error::Result;

/// Create a new entity.
///
/// `Scope` is `()` for top-level resources and the parent id (or parent
/// target) for nested ones.
///
/// # Example
///
/// ```ignore
/// use onapp::{OnAppClient, Network, NetworkCreateParams, Create};
///
/// let client = OnAppClient::from_env()?;
/// let network = Network::create(
///     &client,
///     (),
///     NetworkCreateParams {
///         label: "public".to_string(),
///         vlan: Some(100),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Create: Sized {
    /// Where the entity is created.
    type Scope;

    /// Parameters for the new entity.
    type Params;

    /// Create the entity and return the server's representation of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the parameters or the request fails.
    async fn create(client: &OnAppClient, scope: Self::Scope, params: Self::Params)
        -> Result<Self>;
}
