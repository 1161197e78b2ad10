use async_trait::async_trait;
use axum::Router;

/// Core module: DI/wiring. Runs once at startup, before routes are registered.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    async fn init(&self, ctx: &crate::context::ModuleCtx) -> anyhow::Result<()>;
}

/// Pure wiring; must be sync. Runs AFTER `Module::init`.
pub trait RestfulModule: Send + Sync {
    fn register_rest(
        &self,
        ctx: &crate::context::ModuleCtx,
        router: Router,
    ) -> anyhow::Result<Router>;
}
