//! Fixed CORS headers.
//!
//! The gateway does not reflect the request `Origin`; it always answers with
//! one configured origin and the same header set, on success and failure
//! alike. `tower_http::cors::CorsLayer` only decorates requests that carry an
//! `Origin` and rejects `credentials + *`, so the headers are set directly.

use anyhow::{Context, Result};
use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CorsConfig;

/// Resolve the configured policy into concrete header pairs, validating values.
pub fn fixed_headers(cfg: &CorsConfig) -> Result<Vec<(HeaderName, HeaderValue)>> {
    let value = |name: &str, raw: &str| {
        HeaderValue::from_str(raw).with_context(|| format!("invalid CORS {name} value '{raw}'"))
    };

    if cfg.allowed_origin.trim().is_empty() {
        anyhow::bail!("cors.allowed_origin must not be empty");
    }

    Ok(vec![
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            value("allow_headers", &cfg.allow_headers)?,
        ),
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            value("allowed_origin", &cfg.allowed_origin)?,
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            value("allow_methods", &cfg.allow_methods)?,
        ),
        (
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(if cfg.allow_credentials { "true" } else { "false" }),
        ),
    ])
}

/// Wrap the router so every response carries the fixed CORS headers,
/// overriding anything inner layers or handlers set.
pub fn apply(router: Router, cfg: &CorsConfig) -> Result<Router> {
    let router = fixed_headers(cfg)?
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, value))
        });
    Ok(router)
}
