use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::{Module, ModuleCtx, RestfulModule, TracedClient};
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::CredentialExchangeConfig;
use crate::domain::ports::{CredentialIssuer, DirectoryProvisioner, IdentityVerifier};
use crate::domain::service::Service;
use crate::infra::aws::{self, ChimeDirectoryProvisioner, StsCredentialIssuer, StsIssuerConfig};
use crate::infra::HttpUserinfoVerifier;

/// Credential-exchange module: wires the identity provider, STS and Chime
/// adapters into the domain service and exposes it over REST.
#[derive(Default)]
pub struct CredentialExchange {
    // Set once by `init`, read by `register_rest`.
    service: ArcSwapOption<Service>,
    route: ArcSwapOption<String>,
}

impl CredentialExchange {
    pub const NAME: &'static str = "credential_exchange";

    /// Module with an already-built service (tests, embedding).
    pub fn with_service(service: Service, route: impl Into<String>) -> Self {
        Self {
            service: ArcSwapOption::from_pointee(service),
            route: ArcSwapOption::from_pointee(route.into()),
        }
    }

    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for CredentialExchange {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing credential_exchange module");

        let cfg: CredentialExchangeConfig = ctx.module_config_required()?;
        cfg.validate().context("invalid credential_exchange config")?;
        debug!(
            route = %cfg.route,
            region = cfg.region.as_deref().unwrap_or("<default chain>"),
            session_duration_secs = cfg.session_duration_secs,
            request_deadline_ms = cfg.request_deadline_ms,
            "Loaded credential_exchange config"
        );

        let http = TracedClient::with_timeout(cfg.idp_timeout())
            .context("building identity-provider HTTP client")?;
        let verifier: Arc<dyn IdentityVerifier> =
            Arc::new(HttpUserinfoVerifier::new(http, cfg.userinfo_url()?));

        let sdk = aws::load_sdk_config(cfg.region.as_deref()).await;
        let issuer: Arc<dyn CredentialIssuer> = Arc::new(StsCredentialIssuer::new(
            aws::sts_client(&sdk, cfg.sts_endpoint_url.as_deref()),
            StsIssuerConfig {
                role_arn: cfg.user_role_arn.clone(),
                session_duration_secs: cfg.session_duration_secs,
                session_name_prefix: cfg.session_name_prefix.clone(),
                session_tag_key: cfg.session_tag_key.clone(),
            },
        ));
        let directory: Arc<dyn DirectoryProvisioner> = Arc::new(ChimeDirectoryProvisioner::new(
            aws::chime_client(&sdk, cfg.chime_endpoint_url.as_deref()),
            cfg.app_instance_arn.clone(),
        ));

        let service = Service::new(verifier, issuer, directory, cfg.service_config());
        self.service.store(Some(Arc::new(service)));
        self.route.store(Some(Arc::new(cfg.route)));
        info!("credential_exchange module initialized");
        Ok(())
    }
}

impl RestfulModule for CredentialExchange {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        let route = self
            .route
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Route not initialized"))?;

        info!(route = %route, "Registering credential_exchange REST routes");
        Ok(routes::register_routes(router, &route, service))
    }
}
