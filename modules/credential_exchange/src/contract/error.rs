use thiserror::Error;

/// Errors that are safe to expose outside the module.
///
/// Every failure cause collapses into `Unauthorized`; the distinction between
/// stages lives only in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialExchangeError {
    #[error("Not Authorized")]
    Unauthorized,
}

impl From<crate::domain::error::DomainError> for CredentialExchangeError {
    fn from(_: crate::domain::error::DomainError) -> Self {
        Self::Unauthorized
    }
}
