use std::fmt;

use chrono::{DateTime, Utc};

/// Opaque bearer credential exactly as the caller sent it in `Authorization`.
///
/// Never parsed locally and never printed: `Debug` is redacted and the raw
/// value is only reachable through [`IdentityToken::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw header value, for forwarding to the identity provider.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(<redacted>)")
    }
}

/// Verified, normalized caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Normalized subject; only `[A-Za-z0-9._@-]`, never empty.
    pub uuid: String,
    pub display_name: Option<String>,
    /// Reserved; always `None` for now.
    pub metadata: Option<serde_json::Value>,
}

/// Short-lived cloud credentials scoped to one user via a session tag.
#[derive(Clone, PartialEq, Eq)]
pub struct ScopedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: DateTime<Utc>,
}

impl fmt::Debug for ScopedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// ARN of the user's entry in the messaging directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntryHandle(String);

impl DirectoryEntryHandle {
    pub fn new(arn: impl Into<String>) -> Self {
        Self(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectoryEntryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a client needs to talk to the messaging platform as `user`.
#[derive(Debug, Clone)]
pub struct ExchangeGrant {
    pub app_instance_arn: String,
    pub user: User,
    pub credentials: ScopedCredentials,
    pub entry: DirectoryEntryHandle,
}
