use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, field::Empty, info, instrument};

use crate::contract::model::{ExchangeGrant, IdentityToken, ScopedCredentials, User};
use crate::domain::error::DomainError;
use crate::domain::ports::{CredentialIssuer, DirectoryProvisioner, IdentityVerifier};

/// Orchestrates one credential exchange: verify, then issue and provision
/// concurrently. Holds no per-request state.
#[derive(Clone)]
pub struct Service {
    verifier: Arc<dyn IdentityVerifier>,
    issuer: Arc<dyn CredentialIssuer>,
    directory: Arc<dyn DirectoryProvisioner>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Returned verbatim to clients in every grant.
    pub app_instance_arn: String,
    /// Requested session length; issued credentials may not outlive it.
    pub session_duration: Duration,
    /// Upper bound for the whole exchange.
    pub deadline: Duration,
    /// Tolerance between our clock and the issuer's when checking expiry.
    pub clock_skew: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_instance_arn: String::new(),
            session_duration: Duration::from_secs(3600),
            deadline: Duration::from_secs(10),
            clock_skew: Duration::from_secs(300),
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        issuer: Arc<dyn CredentialIssuer>,
        directory: Arc<dyn DirectoryProvisioner>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            verifier,
            issuer,
            directory,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the full exchange under the configured deadline.
    #[instrument(
        name = "credential_exchange.service.exchange",
        skip_all,
        fields(user_uuid = Empty)
    )]
    pub async fn exchange(&self, token: &IdentityToken) -> Result<ExchangeGrant, DomainError> {
        match tokio::time::timeout(self.config.deadline, self.run(token)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::deadline_exceeded(
                u64::try_from(self.config.deadline.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }

    async fn run(&self, token: &IdentityToken) -> Result<ExchangeGrant, DomainError> {
        if token.is_blank() {
            return Err(DomainError::verification("missing Authorization header"));
        }

        let user = self.verifier.verify(token).await?;
        tracing::Span::current().record("user_uuid", user.uuid.as_str());
        debug!("Identity verified");

        // Either failure drops the other call.
        let (credentials, entry) = tokio::try_join!(
            self.issue_fresh(&user),
            self.directory.ensure_entry(&user)
        )?;

        info!(
            entry = %entry,
            expiration = %credentials.expiration,
            "Credential exchange succeeded"
        );
        Ok(ExchangeGrant {
            app_instance_arn: self.config.app_instance_arn.clone(),
            user,
            credentials,
            entry,
        })
    }

    async fn issue_fresh(&self, user: &User) -> Result<ScopedCredentials, DomainError> {
        let credentials = self.issuer.issue(user).await?;
        self.check_expiry(&credentials, Utc::now())?;
        Ok(credentials)
    }

    fn check_expiry(
        &self,
        credentials: &ScopedCredentials,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if credentials.expiration <= now {
            return Err(DomainError::issuance(format!(
                "credentials already expired at {}",
                credentials.expiration
            )));
        }
        let window = self.config.session_duration + self.config.clock_skew;
        let latest = chrono::Duration::from_std(window)
            .ok()
            .and_then(|w| now.checked_add_signed(w))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if credentials.expiration > latest {
            return Err(DomainError::issuance(format!(
                "credentials expire at {}, beyond the {}s session limit",
                credentials.expiration,
                self.config.session_duration.as_secs()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unused;

    #[async_trait]
    impl IdentityVerifier for Unused {
        async fn verify(&self, _token: &IdentityToken) -> Result<User, DomainError> {
            unreachable!()
        }
    }

    #[async_trait]
    impl CredentialIssuer for Unused {
        async fn issue(&self, _user: &User) -> Result<ScopedCredentials, DomainError> {
            unreachable!()
        }
    }

    #[async_trait]
    impl DirectoryProvisioner for Unused {
        async fn ensure_entry(
            &self,
            _user: &User,
        ) -> Result<crate::contract::model::DirectoryEntryHandle, DomainError> {
            unreachable!()
        }
    }

    fn service() -> Service {
        Service::new(
            Arc::new(Unused),
            Arc::new(Unused),
            Arc::new(Unused),
            ServiceConfig::default(),
        )
    }

    fn expiring_at(expiration: DateTime<Utc>) -> ScopedCredentials {
        ScopedCredentials {
            access_key_id: "ASIA".into(),
            secret_access_key: "secret".into(),
            session_token: "token".into(),
            expiration,
        }
    }

    #[test]
    fn expiry_must_be_in_the_future() {
        let now = Utc::now();
        let err = service()
            .check_expiry(&expiring_at(now), now)
            .unwrap_err();
        assert_eq!(err.stage(), "issuance");
        assert!(service()
            .check_expiry(&expiring_at(now - chrono::Duration::seconds(1)), now)
            .is_err());
    }

    #[test]
    fn expiry_is_bounded_by_session_duration_plus_skew() {
        let now = Utc::now();
        let svc = service();
        assert!(svc
            .check_expiry(&expiring_at(now + chrono::Duration::seconds(3600)), now)
            .is_ok());
        assert!(svc
            .check_expiry(&expiring_at(now + chrono::Duration::seconds(3600 + 300)), now)
            .is_ok());
        let err = svc
            .check_expiry(&expiring_at(now + chrono::Duration::seconds(3600 + 301)), now)
            .unwrap_err();
        assert!(err.to_string().contains("3600s session limit"));
    }

    #[tokio::test]
    async fn blank_token_fails_without_calling_ports() {
        // `Unused` panics if reached
        let err = service()
            .exchange(&IdentityToken::new("  "))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::verification("missing Authorization header"));
    }
}
