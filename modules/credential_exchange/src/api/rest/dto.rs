use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{ExchangeGrant, ScopedCredentials};

/// Successful exchange body; field names are what Chime SDK clients expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExchangeResponseDto {
    pub app_instance_arn: String,
    pub chime_app_instance_user_arn: String,
    pub chime_user_id: String,
    pub chime_credentials: CredentialsDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chime_display_name: Option<String>,
}

/// STS credential shape.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialsDto {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialsDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsDto")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

impl From<ScopedCredentials> for CredentialsDto {
    fn from(c: ScopedCredentials) -> Self {
        Self {
            access_key_id: c.access_key_id,
            secret_access_key: c.secret_access_key,
            session_token: c.session_token,
            expiration: c.expiration,
        }
    }
}

impl From<ExchangeGrant> for ExchangeResponseDto {
    fn from(grant: ExchangeGrant) -> Self {
        Self {
            app_instance_arn: grant.app_instance_arn,
            chime_app_instance_user_arn: grant.entry.as_str().to_owned(),
            chime_user_id: grant.user.uuid,
            chime_credentials: grant.credentials.into(),
            chime_display_name: grant.user.display_name,
        }
    }
}
