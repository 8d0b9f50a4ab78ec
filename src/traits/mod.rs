//! Trait definitions for OnApp operations.
//!
//! Each resource type implements the traits matching the verbs its
//! endpoints support, encapsulating path and envelope differences in the
//! implementations.

mod create;
mod delete;
mod edit;
mod get;
mod list;
mod resource;

pub use create::Create;
pub use delete::{Delete, NoOptions};
pub use edit::Edit;
pub use get::Get;
pub use list::{List, DEFAULT_PAGE_SIZE};
pub(crate) use list::MAX_PAGES;
pub use resource::Resource;
