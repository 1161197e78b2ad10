use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::types::Tag;
use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::contract::model::{ScopedCredentials, User};
use crate::domain::error::DomainError;
use crate::domain::normalize::truncate_chars;
use crate::domain::ports::CredentialIssuer;

/// STS caps `RoleSessionName` at 64 characters.
const MAX_SESSION_NAME_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct StsIssuerConfig {
    pub role_arn: String,
    pub session_duration_secs: u32,
    pub session_name_prefix: String,
    pub session_tag_key: String,
}

/// `AssumeRole` adapter tagging each session with the caller's uuid.
pub struct StsCredentialIssuer {
    client: aws_sdk_sts::Client,
    config: StsIssuerConfig,
}

impl StsCredentialIssuer {
    pub fn new(client: aws_sdk_sts::Client, config: StsIssuerConfig) -> Self {
        Self { client, config }
    }

    fn session_name(&self, uuid: &str) -> String {
        let full = format!("{}{}", self.config.session_name_prefix, uuid);
        truncate_chars(&full, MAX_SESSION_NAME_LEN).to_owned()
    }
}

#[async_trait]
impl CredentialIssuer for StsCredentialIssuer {
    #[instrument(
        name = "credential_exchange.sts.assume_role",
        skip_all,
        fields(role_arn = %self.config.role_arn, user_uuid = %user.uuid)
    )]
    async fn issue(&self, user: &User) -> Result<ScopedCredentials, DomainError> {
        let tag = Tag::builder()
            .key(&self.config.session_tag_key)
            .value(&user.uuid)
            .build()
            .map_err(|e| DomainError::issuance(format!("building session tag: {e}")))?;
        let duration = i32::try_from(self.config.session_duration_secs)
            .map_err(|_| DomainError::issuance("session duration out of range"))?;

        let output = self
            .client
            .assume_role()
            .role_arn(&self.config.role_arn)
            .role_session_name(self.session_name(&user.uuid))
            .duration_seconds(duration)
            .tags(tag)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %DisplayErrorContext(&e), "AssumeRole failed");
                DomainError::issuance("AssumeRole failed")
            })?;

        let creds = output
            .credentials()
            .ok_or_else(|| DomainError::issuance("AssumeRole returned no credentials"))?;
        let expiration = creds.expiration();
        let expiration = DateTime::<Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos())
            .ok_or_else(|| DomainError::issuance("credential expiration out of range"))?;

        Ok(ScopedCredentials {
            access_key_id: creds.access_key_id().to_owned(),
            secret_access_key: creds.secret_access_key().to_owned(),
            session_token: creds.session_token().to_owned(),
            expiration,
        })
    }
}
