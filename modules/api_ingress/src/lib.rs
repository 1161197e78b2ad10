use async_trait::async_trait;
use std::sync::Arc;

use arc_swap::ArcSwap;

use anyhow::Result;
use axum::{middleware::from_fn, routing::get, Router};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod cors;
pub mod request_id;
mod web;

pub use config::{ApiIngressConfig, CorsConfig};

/// API ingress: owns the HTTP server and the middleware stack every module's
/// routes are mounted under.
pub struct ApiIngress {
    // Lock-free config using arc-swap for read-mostly access
    config: ArcSwap<ApiIngressConfig>,
    // Router assembled during the REST phase, taken by `serve`
    final_router: Mutex<Option<Router>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            final_router: Mutex::new(None),
        }
    }

    /// Get the current configuration (cheap clone from ArcSwap)
    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Fill the bind address from the server section when the module leaves it empty.
    pub fn apply_server_defaults(&self, server_bind_addr: &str) {
        let mut cfg = self.get_config();
        if cfg.bind_addr.trim().is_empty() {
            cfg.bind_addr = server_bind_addr.to_string();
            self.config.store(Arc::new(cfg));
        }
    }

    /// Wrap module routes with `/health` and the full middleware stack.
    ///
    /// Layers, innermost to outermost:
    /// BodyLimit -> Timeout -> request-id extension -> Trace -> PropagateRequestId
    /// -> SetRequestId -> fixed CORS headers.
    pub fn build_router(&self, routes: Router) -> Result<Router> {
        let config = self.get_config();
        let x_request_id = crate::request_id::header();

        let router = Router::new()
            .route("/health", get(web::health_check))
            .merge(routes)
            .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeout_sec)))
            .layer(from_fn(crate::request_id::push_req_id_to_extensions))
            .layer(crate::request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(
                x_request_id,
                crate::request_id::MakeReqId,
            ));

        // Outermost, so timeouts and body-limit rejections carry the headers too.
        cors::apply(router, &config.cors)
    }

    /// Keep the finalized router until `serve` takes it.
    pub fn set_router(&self, router: Router) {
        *self.final_router.lock() = Some(router);
    }

    /// Bind, serve until cancelled, then drain in-flight requests.
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        // Take the router so the guard is dropped before awaiting
        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving /health only");
                self.build_router(Router::new())?
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> anyhow::Result<()> {
        let cfg: ApiIngressConfig = ctx.module_config_or_default()?;
        // Fail fast on a bad CORS policy instead of on the first request.
        cors::fixed_headers(&cfg.cors)?;
        tracing::debug!(
            module = "api_ingress",
            bind_addr = %cfg.bind_addr,
            timeout_sec = cfg.timeout_sec,
            "Module initialized"
        );
        self.config.store(Arc::new(cfg));
        Ok(())
    }
}
