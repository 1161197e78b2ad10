use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::service::ServiceConfig;

/// Shortest and longest session STS accepts for `AssumeRole`.
pub const SESSION_DURATION_RANGE: std::ops::RangeInclusive<u32> = 900..=43200;

/// Configuration for the credential_exchange module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialExchangeConfig {
    /// Path the exchange handler is mounted on; answers every method.
    #[serde(default = "default_route")]
    pub route: String,
    /// AWS region; falls back to the SDK default chain (`AWS_REGION`, profile).
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub app_instance_arn: String,
    #[serde(default)]
    pub user_role_arn: String,
    #[serde(default = "default_session_duration_secs")]
    pub session_duration_secs: u32,
    #[serde(default = "default_session_name_prefix")]
    pub session_name_prefix: String,
    #[serde(default = "default_session_tag_key")]
    pub session_tag_key: String,
    #[serde(default = "default_request_deadline_ms")]
    pub request_deadline_ms: u64,
    #[serde(default)]
    pub identity_provider: IdentityProviderConfig,
    /// Endpoint override for STS (local emulators, tests).
    #[serde(default)]
    pub sts_endpoint_url: Option<String>,
    /// Endpoint override for Chime SDK Identity.
    #[serde(default)]
    pub chime_endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityProviderConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_userinfo_path")]
    pub userinfo_path: String,
    #[serde(default = "default_idp_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CredentialExchangeConfig {
    fn default() -> Self {
        Self {
            route: default_route(),
            region: None,
            app_instance_arn: String::new(),
            user_role_arn: String::new(),
            session_duration_secs: default_session_duration_secs(),
            session_name_prefix: default_session_name_prefix(),
            session_tag_key: default_session_tag_key(),
            request_deadline_ms: default_request_deadline_ms(),
            identity_provider: IdentityProviderConfig::default(),
            sts_endpoint_url: None,
            chime_endpoint_url: None,
        }
    }
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            userinfo_path: default_userinfo_path(),
            timeout_ms: default_idp_timeout_ms(),
        }
    }
}

impl CredentialExchangeConfig {
    /// Reject configurations that could only fail at request time.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.route.starts_with('/') {
            bail!("route must start with '/', got '{}'", self.route);
        }
        if !self.app_instance_arn.starts_with("arn:") {
            bail!("app_instance_arn must be an ARN, got '{}'", self.app_instance_arn);
        }
        if !self.user_role_arn.starts_with("arn:") {
            bail!("user_role_arn must be an ARN, got '{}'", self.user_role_arn);
        }
        if !SESSION_DURATION_RANGE.contains(&self.session_duration_secs) {
            bail!(
                "session_duration_secs must be within {}..={}, got {}",
                SESSION_DURATION_RANGE.start(),
                SESSION_DURATION_RANGE.end(),
                self.session_duration_secs
            );
        }
        if self.session_tag_key.trim().is_empty() {
            bail!("session_tag_key must not be empty");
        }
        if self.request_deadline_ms == 0 {
            bail!("request_deadline_ms must be positive");
        }
        self.userinfo_url()?;
        for (name, url) in [
            ("sts_endpoint_url", &self.sts_endpoint_url),
            ("chime_endpoint_url", &self.chime_endpoint_url),
        ] {
            if let Some(url) = url {
                Url::parse(url).with_context(|| format!("invalid {name} '{url}'"))?;
            }
        }
        Ok(())
    }

    /// `{base_url}{userinfo_path}` as a parsed URL.
    pub fn userinfo_url(&self) -> anyhow::Result<Url> {
        let idp = &self.identity_provider;
        let base = Url::parse(&idp.base_url)
            .with_context(|| format!("invalid identity_provider.base_url '{}'", idp.base_url))?;
        if !matches!(base.scheme(), "https" | "http") {
            bail!(
                "identity_provider.base_url must be http(s), got '{}'",
                base.scheme()
            );
        }
        base.join(&idp.userinfo_path).with_context(|| {
            format!(
                "invalid identity_provider.userinfo_path '{}'",
                idp.userinfo_path
            )
        })
    }

    /// The deadline must expire before an outer HTTP timeout, so a slow
    /// exchange still ends in the fixed unauthorized response.
    pub fn ensure_deadline_within(&self, outer_timeout: Duration) -> anyhow::Result<()> {
        let deadline = Duration::from_millis(self.request_deadline_ms);
        if deadline >= outer_timeout {
            bail!(
                "request_deadline_ms ({}) must be below the ingress timeout ({} ms)",
                self.request_deadline_ms,
                outer_timeout.as_millis()
            );
        }
        Ok(())
    }

    pub fn idp_timeout(&self) -> Duration {
        Duration::from_millis(self.identity_provider.timeout_ms)
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            app_instance_arn: self.app_instance_arn.clone(),
            session_duration: Duration::from_secs(u64::from(self.session_duration_secs)),
            deadline: Duration::from_millis(self.request_deadline_ms),
            ..ServiceConfig::default()
        }
    }
}

fn default_route() -> String {
    "/creds".to_string()
}

fn default_session_duration_secs() -> u32 {
    3600
}

fn default_session_name_prefix() -> String {
    "chime_".to_string()
}

fn default_session_tag_key() -> String {
    "UserUUID".to_string()
}

fn default_request_deadline_ms() -> u64 {
    10_000
}

fn default_userinfo_path() -> String {
    "/userinfo".to_string()
}

fn default_idp_timeout_ms() -> u64 {
    5_000
}
