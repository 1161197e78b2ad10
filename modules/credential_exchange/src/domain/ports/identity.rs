use async_trait::async_trait;

use crate::contract::model::{IdentityToken, User};
use crate::domain::error::DomainError;

/// Verifies a bearer token with the identity provider.
///
/// Implementations make exactly one outbound call and never retry. Any
/// failure is a [`DomainError::Verification`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &IdentityToken) -> Result<User, DomainError>;
}
