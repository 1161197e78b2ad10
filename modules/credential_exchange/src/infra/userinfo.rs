use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::contract::model::{IdentityToken, User};
use crate::domain::error::DomainError;
use crate::domain::normalize::{normalize_subject, MAX_USER_ID_CHARS};
use crate::domain::ports::IdentityVerifier;
use modkit::TracedClient;

/// OIDC userinfo adapter: forwards the caller's `Authorization` header
/// verbatim and trusts the provider's answer.
pub struct HttpUserinfoVerifier {
    client: TracedClient,
    userinfo_url: Url,
}

#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl HttpUserinfoVerifier {
    pub fn new(client: TracedClient, userinfo_url: Url) -> Self {
        Self {
            client,
            userinfo_url,
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpUserinfoVerifier {
    #[instrument(
        name = "credential_exchange.idp.userinfo",
        skip_all,
        fields(url = %self.userinfo_url)
    )]
    async fn verify(&self, token: &IdentityToken) -> Result<User, DomainError> {
        let mut auth = HeaderValue::from_str(token.expose())
            .map_err(|_| DomainError::verification("Authorization header is not a valid header value"))?;
        auth.set_sensitive(true);

        let request = self
            .client
            .request(reqwest::Method::GET, self.userinfo_url.as_str())
            .header(AUTHORIZATION, auth)
            .build()
            .map_err(|e| DomainError::verification(format!("building userinfo request: {e}")))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| DomainError::verification(format!("userinfo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::verification(format!("HTTP {status}")));
        }

        let body: UserinfoResponse = response
            .json()
            .await
            .map_err(|e| DomainError::verification(format!("userinfo body is not JSON: {e}")))?;

        let sub = body
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DomainError::verification("userinfo response has no subject"))?;
        let display_name = body.name.filter(|n| !n.trim().is_empty());

        let uuid = normalize_subject(&sub);
        if uuid.chars().count() > MAX_USER_ID_CHARS {
            return Err(DomainError::verification(format!(
                "subject exceeds {MAX_USER_ID_CHARS} characters"
            )));
        }

        let user = User {
            uuid,
            display_name,
            metadata: None,
        };
        debug!(user_uuid = %user.uuid, "Userinfo accepted");
        Ok(user)
    }
}
