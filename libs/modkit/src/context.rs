use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    /// Returns raw JSON section for the module, if any.
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

#[derive(Clone)]
pub struct ModuleCtx {
    pub(crate) config_provider: Option<Arc<dyn ConfigProvider>>,
    pub(crate) cancellation_token: CancellationToken,
    pub(crate) module_name: Option<Arc<str>>,
}

pub struct ModuleCtxBuilder {
    inner: ModuleCtx,
}

impl ModuleCtxBuilder {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            inner: ModuleCtx {
                config_provider: None,
                cancellation_token: token,
                module_name: None,
            },
        }
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.inner.config_provider = Some(p);
        self
    }

    pub fn build(self) -> ModuleCtx {
        self.inner
    }
}

impl ModuleCtx {
    /// Scope a context to a specific module name; config lookups use this name.
    pub fn for_module(&self, name: &str) -> Self {
        let mut scoped = self.clone();
        scoped.module_name = Some(Arc::<str>::from(name));
        scoped
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    pub fn current_module(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Deserialize the module's config into `T`, or `T::default()` when the
    /// section is absent. A present but invalid section is an error.
    pub fn module_config_or_default<T: DeserializeOwned + Default>(&self) -> anyhow::Result<T> {
        if self.raw_section().is_none() {
            return Ok(T::default());
        }
        self.module_config_required()
    }

    /// Strict: deserialize the module's config into `T`, returning a pathful error on failure.
    pub fn module_config_required<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        let name = self
            .module_name
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("context is not scoped to a module"))?;

        if self.config_provider.is_none() {
            anyhow::bail!("no ConfigProvider");
        }

        let val = self
            .raw_section()
            .ok_or_else(|| anyhow::anyhow!("missing module config: {name}"))?;

        serde_json::from_value(val.clone())
            .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}"))
    }

    fn raw_section(&self) -> Option<&serde_json::Value> {
        match (&self.module_name, &self.config_provider) {
            (Some(name), Some(p)) => p.get_module_config(name),
            _ => None,
        }
    }
}
