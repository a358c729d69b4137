//! Permission checks supplied by the host

/// Answers whether the current user may create or write an entity type.
///
/// Consulted before any state change; a `false` means the mutation never
/// starts.
pub trait Capabilities: Send + Sync {
    fn can_create(&self, entity: &str) -> bool;
    fn can_write(&self, entity: &str) -> bool;
}

/// Grants everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Capabilities for AllowAll {
    fn can_create(&self, _entity: &str) -> bool {
        true
    }

    fn can_write(&self, _entity: &str) -> bool {
        true
    }
}
