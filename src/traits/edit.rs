//! Edit trait for modifying entities.

use async_trait::async_trait;

use crate::client::OnAppClient;
use crate::error::Result;

/// Modify an existing entity.
///
/// OnApp answers edits with `204 No Content`, so nothing is returned; fetch
/// the entity again with [`Get`](crate::Get) to observe the new state.
#[async_trait]
pub trait Edit {
    /// The ID type for this entity.
    type Id;

    /// Parameters for the edit.
    type Params;

    /// Apply the edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn edit(client: &OnAppClient, id: Self::Id, params: Self::Params) -> Result<()>;
}
