//! Delete trait for removing entities.

use async_trait::async_trait;
use serde::Serialize;

use crate::client::OnAppClient;
use crate::error::Result;

/// Empty query options for deletes that take none.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoOptions {}

/// Remove an entity.
///
/// Deletion is usually asynchronous on the OnApp side; use
/// [`Transaction::last`](crate::Transaction::last) to follow the job it
/// schedules.
#[async_trait]
pub trait Delete {
    /// The ID type for this entity.
    type Id;

    /// Query options sent with the request.
    type Options: Serialize + Default + Send + Sync;

    /// Delete the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn delete(client: &OnAppClient, id: Self::Id, options: Self::Options) -> Result<()>;
}
