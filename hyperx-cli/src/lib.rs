//! hyperx CLI library
//!
//! Offline tooling for a hyperx site directory: render a component, check
//! that every configured component loads, and run JSON responses through a
//! page's templates.

pub mod commands;

use anyhow::{Context, Result};
use hyperx::components::{FsTransport, HttpTransport, Transport};
use hyperx::config::{HyperxConfig, CONFIG_FILE};
use hyperx::host::{HtmxHost, NullHost};
use hyperx::state::HyperxState;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A site directory and its configuration
#[derive(Debug, Clone)]
pub struct Site {
    root: PathBuf,
    config: HyperxConfig,
}

impl Site {
    /// Open a site, reading `hpxconfig.json` (or `config_file`) below `root`
    ///
    /// Relative `rootDir`/`componentsDir` values are resolved against the
    /// site directory.
    pub fn open(root: impl Into<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let root = root.into();
        let config_path = config_file.map_or_else(|| root.join(CONFIG_FILE), |file| root.join(file));

        let mut config = HyperxConfig::load_from(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        config.resolve_paths("", "");
        tracing::debug!(
            root = %root.display(),
            components_dir = %config.project.components_dir,
            "Opened site"
        );

        Ok(Self { root, config })
    }

    /// The site directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The resolved configuration
    #[must_use]
    pub const fn config(&self) -> &HyperxConfig {
        &self.config
    }

    /// Transport for the components directory
    ///
    /// HTTP(S) component directories are fetched over the network; anything
    /// else is read from the site directory.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        if self.config.project.components_dir.starts_with("http") {
            Arc::new(HttpTransport::new())
        } else {
            Arc::new(FsTransport::new(&self.root))
        }
    }

    /// Application state backed by this site
    #[must_use]
    pub fn state(&self) -> HyperxState {
        self.state_with_host(Arc::new(NullHost))
    }

    /// Application state with a custom host
    #[must_use]
    pub fn state_with_host(&self, host: Arc<dyn HtmxHost>) -> HyperxState {
        HyperxState::new(self.config.clone(), self.transport(), host)
    }
}
