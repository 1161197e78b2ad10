use serde::{Deserialize, Serialize};

/// API ingress configuration (`modules.api_ingress`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port` to bind; empty means "use server.host/server.port".
    #[serde(default)]
    pub bind_addr: String,
    /// Coarse per-request timeout applied to every route.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Fixed cross-origin headers stamped onto every response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            timeout_sec: default_timeout_sec(),
            body_limit_bytes: default_body_limit_bytes(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
            allow_headers: default_allow_headers(),
            allow_methods: default_allow_methods(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

fn default_timeout_sec() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_allow_headers() -> String {
    "*".to_string()
}

fn default_allow_methods() -> String {
    "POST, OPTIONS".to_string()
}

fn default_allow_credentials() -> bool {
    true
}
