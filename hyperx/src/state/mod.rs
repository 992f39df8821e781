//! Application state
//!
//! [`HyperxState`] owns every service of a page: configuration, the
//! component registry, loader and binder, the JSON interceptor with its
//! template store, and template proxies. Services are shared handles, so
//! cloning the state is cheap and tests can build as many isolated
//! instances as they need.

use std::sync::Arc;

use crate::components::{
    ComponentLoader, ComponentRegistry, CustomElementBinder, HttpTransport, LoadReport, Transport,
};
use crate::config::HyperxConfig;
use crate::error::{HyperxError, Result};
use crate::host::HtmxHost;
use crate::jrx::{JsonInterceptor, ProxySetup, TemplateProxies, TemplateStore};
use crate::template::Fragment;

/// Outcome of a successful initialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Batch load results
    pub load: LoadReport,
    /// Tags defined with the host
    pub defined: Vec<String>,
}

/// Application state for hyperx pages
///
/// # Example
///
/// ```rust,no_run
/// use hyperx::prelude::*;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = HyperxConfig::load_or_default("./hpxconfig.json", "https://app.example.com", "/");
/// let state = HyperxState::with_http(config, Arc::new(NullHost));
///
/// let report = state.initialize().await?;
/// tracing::info!(defined = ?report.defined, "Components ready");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HyperxState {
    config: Arc<HyperxConfig>,
    registry: ComponentRegistry,
    loader: Arc<ComponentLoader>,
    binder: Arc<CustomElementBinder>,
    interceptor: JsonInterceptor,
    proxies: TemplateProxies,
}

impl std::fmt::Debug for HyperxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperxState")
            .field("project", &self.config.project.name)
            .field("registry", &self.registry)
            .field("store", self.interceptor.store())
            .finish_non_exhaustive()
    }
}

impl HyperxState {
    /// Create state from configuration, a transport and a host
    #[must_use]
    pub fn new(config: HyperxConfig, transport: Arc<dyn Transport>, host: Arc<dyn HtmxHost>) -> Self {
        let config = Arc::new(config);
        let registry = ComponentRegistry::new();
        let loader = ComponentLoader::new(registry.clone(), transport, Arc::clone(&config));
        let binder = CustomElementBinder::new(registry.clone(), Arc::clone(&host), config.render.clone());
        let proxies = TemplateProxies::from_settings(host, &config.render);

        Self {
            config,
            registry,
            loader: Arc::new(loader),
            binder: Arc::new(binder),
            interceptor: JsonInterceptor::new(TemplateStore::new()),
            proxies,
        }
    }

    /// Create state fetching components over HTTP
    #[must_use]
    pub fn with_http(config: HyperxConfig, host: Arc<dyn HtmxHost>) -> Self {
        Self::new(config, Arc::new(HttpTransport::new()), host)
    }

    /// Application configuration
    #[must_use]
    pub fn config(&self) -> &HyperxConfig {
        &self.config
    }

    /// Component registry
    #[must_use]
    pub const fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Component loader
    #[must_use]
    pub fn loader(&self) -> &ComponentLoader {
        &self.loader
    }

    /// Custom element binder
    #[must_use]
    pub fn binder(&self) -> &CustomElementBinder {
        &self.binder
    }

    /// JSON response interceptor
    #[must_use]
    pub const fn interceptor(&self) -> &JsonInterceptor {
        &self.interceptor
    }

    /// Template proxies
    #[must_use]
    pub const fn proxies(&self) -> &TemplateProxies {
        &self.proxies
    }

    /// Load every configured component and define its element
    ///
    /// # Errors
    ///
    /// Fails when the components directory is not configured, and, with
    /// `loader.failOnPartialLoad`, when any component failed to load.
    pub async fn initialize(&self) -> Result<InitReport> {
        tracing::info!(project = %self.config.project.name, "Initializing");

        let load = self.loader.load_all().await?;
        let defined = self.binder.define_all_registered();

        if self.config.loader.fail_on_partial_load && !load.is_complete() {
            return Err(HyperxError::PartialLoad {
                loaded: load.loaded.len(),
                requested: load.requested,
                failed: load.failed,
            });
        }

        tracing::info!(loaded = load.loaded.len(), defined = defined.len(), "Initialized");
        Ok(InitReport { load, defined })
    }

    /// Prepare a freshly loaded page
    ///
    /// Snapshots named templates and inserts template proxies. Proxies that
    /// fire on `load` are returned for [`TemplateProxies::schedule`].
    pub fn page_loaded(&self, page: &mut Fragment) -> ProxySetup {
        self.interceptor.page_loaded(page);
        self.proxies.setup(page)
    }

    /// Bind component tags that appeared in new content
    pub fn content_inserted(&self, page: &Fragment) -> Vec<String> {
        let mut tags: Vec<&str> = page
            .find_all(&|el| self.registry.has(&el.tag))
            .into_iter()
            .map(|el| el.tag.as_str())
            .collect();
        tags.sort_unstable();
        tags.dedup();
        self.binder.notify_inserted(tags)
    }
}
