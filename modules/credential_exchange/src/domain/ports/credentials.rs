use async_trait::async_trait;

use crate::contract::model::{ScopedCredentials, User};
use crate::domain::error::DomainError;

/// Issues fresh, time-bounded credentials tagged with the user's uuid.
///
/// Not idempotent: every call yields a new bundle.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn issue(&self, user: &User) -> Result<ScopedCredentials, DomainError>;
}
