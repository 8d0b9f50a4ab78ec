//! Common resource metadata.

/// A vendor resource with a numeric id and a JSON envelope key.
pub trait Resource {
    /// The key the API wraps this resource under (e.g. `"hypervisor"`).
    const KEY: &'static str;

    /// The resource id.
    fn id(&self) -> u64;
}
