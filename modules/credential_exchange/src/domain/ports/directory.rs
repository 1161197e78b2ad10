use async_trait::async_trait;

use crate::contract::model::{DirectoryEntryHandle, User};
use crate::domain::error::DomainError;

/// Create-if-absent for the user's directory entry, keyed by `user.uuid`.
///
/// Calling twice for the same uuid returns the same handle.
#[async_trait]
pub trait DirectoryProvisioner: Send + Sync {
    async fn ensure_entry(&self, user: &User) -> Result<DirectoryEntryHandle, DomainError>;
}
