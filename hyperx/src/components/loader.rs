//! Component loading
//!
//! Resolves where a component lives (nested `dir/name/name.hpx` before flat
//! `dir/name.hpx`), fetches its source together with the sibling
//! stylesheet, scopes and merges the styles, and registers the result.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use thiserror::Error;

use super::registry::{ComponentRegistry, RegistrationError};
use super::styles::merge_styles;
use super::transport::{FetchResponse, Transport, TransportError};
use crate::config::HyperxConfig;
use crate::paths::PathResolver;
use crate::template::{extract_style_content, file_stem, splice_style_block};

/// Why a component failed to load
#[derive(Debug, Error)]
pub enum LoadError {
    /// The loader has no usable components directory
    #[error("configuration error: {0}")]
    Config(String),

    /// The component source does not exist
    #[error("component file not found at: {0}")]
    NotFound(String),

    /// A fetch returned an unexpected status
    #[error("HTTP error! status: {status} for {path}")]
    Status {
        /// Requested path
        path: String,
        /// Response status
        status: http::StatusCode,
    },

    /// The request could not be completed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The fetched source could not be registered
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// Where a component's files were found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Location of the component source
    pub path: String,
    /// Whether the nested (`name/name.ext`) layout was found
    pub is_nested: bool,
}

/// Outcome of a batch load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of valid descriptors that were attempted
    pub requested: usize,
    /// Tag names of components that registered successfully
    pub loaded: Vec<String>,
    /// Descriptor names that failed
    pub failed: Vec<String>,
}

impl LoadReport {
    /// Whether every requested component loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.loaded.len() == self.requested
    }
}

/// Loads component files and registers them
pub struct ComponentLoader {
    registry: ComponentRegistry,
    transport: Arc<dyn Transport>,
    config: Arc<HyperxConfig>,
    components_dir: OnceCell<String>,
}

impl std::fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLoader")
            .field("components_dir", &self.components_dir.get())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ComponentLoader {
    /// Create a loader that registers into `registry`
    pub fn new(
        registry: ComponentRegistry,
        transport: Arc<dyn Transport>,
        config: Arc<HyperxConfig>,
    ) -> Self {
        Self {
            registry,
            transport,
            config,
            components_dir: OnceCell::new(),
        }
    }

    /// Read the components directory from configuration (idempotent)
    pub fn initialize(&self) -> Result<&str, LoadError> {
        self.components_dir
            .get_or_try_init(|| {
                let dir = self.config.project.components_dir.trim();
                if dir.is_empty() {
                    return Err(LoadError::Config(
                        "project.componentsDir is not set".to_string(),
                    ));
                }
                tracing::debug!(components_dir = dir, "Component loader initialized");
                Ok(dir.to_string())
            })
            .map(String::as_str)
    }

    /// Whether [`ComponentLoader::initialize`] has run successfully
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.components_dir.get().is_some()
    }

    /// The registry components are loaded into
    #[must_use]
    pub const fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    fn extension(&self) -> &str {
        &self.config.loader.extension
    }

    /// `name` with the component extension appended if missing
    #[must_use]
    pub fn normalize_name(&self, name: &str) -> String {
        let suffix = format!(".{}", self.extension());
        if name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }

    fn base_name<'a>(&self, name: &'a str) -> &'a str {
        let suffix = format!(".{}", self.extension()).to_ascii_lowercase();
        if name.len() > suffix.len() && name.to_ascii_lowercase().ends_with(&suffix) {
            &name[..name.len() - suffix.len()]
        } else {
            name
        }
    }

    /// Path of a sibling asset (e.g. the stylesheet) for the given layout
    pub fn asset_path(&self, name: &str, extension: &str, is_nested: bool) -> Result<String, LoadError> {
        let dir = self.initialize()?;
        let base = self.base_name(name);
        let file = format!("{}.{extension}", file_stem(base));
        Ok(if is_nested {
            PathResolver::join([dir, base, file.as_str()])
        } else {
            PathResolver::join([dir, format!("{base}.{extension}").as_str()])
        })
    }

    /// Find the component source, preferring the nested layout
    ///
    /// Never fails on missing files: when neither layout exists the flat
    /// path is returned.
    pub async fn resolve_location(&self, name: &str) -> Result<ResolvedPath, LoadError> {
        let ext = self.extension().to_string();
        let nested = self.asset_path(name, &ext, true)?;

        let nested_exists = match self.transport.exists(&nested).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::debug!(path = %nested, error = %err, "Nested probe failed");
                false
            }
        };

        if nested_exists {
            tracing::debug!(path = %nested, "Found component in nested structure");
            return Ok(ResolvedPath {
                path: nested,
                is_nested: true,
            });
        }

        let flat = self.asset_path(name, &ext, false)?;
        tracing::debug!(path = %flat, "Using flat structure for component");
        Ok(ResolvedPath {
            path: flat,
            is_nested: false,
        })
    }

    /// Load and register one component, logging failures
    ///
    /// Returns `true` when the component was registered.
    pub async fn load(&self, name: &str) -> bool {
        match self.try_load(name).await {
            Ok(tag) => {
                tracing::info!(component = %tag, "Successfully loaded component with styles");
                true
            }
            Err(err) => {
                tracing::error!(component = name, error = %err, "Error loading component");
                false
            }
        }
    }

    /// Load and register one component, returning its tag name
    pub async fn try_load(&self, name: &str) -> Result<String, LoadError> {
        self.initialize()?;

        let normalized = self.normalize_name(name);
        let location = self.resolve_location(&normalized).await?;
        let css_path = self.asset_path(
            &normalized,
            &self.config.loader.style_extension,
            location.is_nested,
        )?;
        tracing::debug!(
            path = %location.path,
            layout = if location.is_nested { "nested" } else { "flat" },
            "Loading component"
        );

        let (source, stylesheet) = tokio::join!(
            self.fetch_source(&location.path),
            self.fetch_stylesheet(&css_path)
        );
        let source = source?;
        let stylesheet = stylesheet?;

        let inline = extract_style_content(&source).unwrap_or_default();
        let merged = merge_styles(&normalized, inline, stylesheet.as_deref());
        let content = splice_style_block(&source, &merged);

        Ok(self.registry.try_register(&normalized, &content)?)
    }

    async fn fetch_source(&self, path: &str) -> Result<String, LoadError> {
        let FetchResponse { status, body } = self.transport.get(path).await?;
        if status == http::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status,
            });
        }
        Ok(body)
    }

    async fn fetch_stylesheet(&self, path: &str) -> Result<Option<String>, LoadError> {
        let FetchResponse { status, body } = self.transport.get(path).await?;
        if status == http::StatusCode::NOT_FOUND {
            tracing::debug!(path, "No CSS file found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status,
            });
        }
        Ok(Some(body))
    }

    /// Load every component listed in configuration, concurrently
    ///
    /// Individual failures are logged and reported, never raised. The only
    /// error is a missing components directory.
    pub async fn load_all(&self) -> Result<LoadReport, LoadError> {
        self.initialize()?;

        let components = self.config.normalized_components();
        if components.is_empty() {
            tracing::warn!("No valid components specified in the configuration");
            return Ok(LoadReport::default());
        }

        tracing::info!(count = components.len(), "Loading components");

        let results = futures_util::future::join_all(components.iter().map(|component| async move {
            let outcome = self.try_load(&component.path).await;
            (component, outcome)
        }))
        .await;

        let mut report = LoadReport {
            requested: components.len(),
            ..LoadReport::default()
        };
        for (component, outcome) in results {
            match outcome {
                Ok(tag) => report.loaded.push(tag),
                Err(err) => {
                    tracing::error!(component = %component.name, error = %err, "Error loading component");
                    report.failed.push(component.name.clone());
                }
            }
        }

        tracing::info!(
            loaded = report.loaded.len(),
            requested = report.requested,
            "Successfully loaded {}/{} components",
            report.loaded.len(),
            report.requested
        );
        if !report.is_complete() {
            tracing::warn!(failed = ?report.failed, "Some components failed to load");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::transport::MockTransport;
    use crate::config::ComponentEntry;
    use mockall::predicate::eq;

    const BASE: &str = "https://app.test/components";

    fn config_with(components: Vec<ComponentEntry>) -> Arc<HyperxConfig> {
        let mut config = HyperxConfig::default();
        config.project.components_dir = BASE.to_string();
        config.components = components;
        Arc::new(config)
    }

    fn loader(transport: MockTransport, config: Arc<HyperxConfig>) -> ComponentLoader {
        ComponentLoader::new(ComponentRegistry::new(), Arc::new(transport), config)
    }

    #[test]
    fn test_normalize_name() {
        let loader = loader(MockTransport::new(), config_with(vec![]));
        assert_eq!(loader.normalize_name("user-card"), "user-card.hpx");
        assert_eq!(loader.normalize_name("UserCard.HPX"), "UserCard.HPX");
    }

    #[test]
    fn test_asset_paths() {
        let loader = loader(MockTransport::new(), config_with(vec![]));
        assert_eq!(
            loader.asset_path("user-card.hpx", "css", false).unwrap(),
            format!("{BASE}/user-card.css")
        );
        assert_eq!(
            loader.asset_path("user-card.hpx", "css", true).unwrap(),
            format!("{BASE}/user-card/user-card.css")
        );
        assert_eq!(
            loader.asset_path("forms/SignUp.hpx", "hpx", true).unwrap(),
            format!("{BASE}/forms/SignUp/SignUp.hpx")
        );
    }

    #[test]
    fn test_initialize_requires_components_dir() {
        let mut config = HyperxConfig::default();
        config.project.components_dir = "  ".to_string();
        let loader = loader(MockTransport::new(), Arc::new(config));
        assert!(matches!(loader.initialize(), Err(LoadError::Config(_))));
        assert!(!loader.is_initialized());
    }

    #[tokio::test]
    async fn test_resolve_prefers_nested() {
        let mut transport = MockTransport::new();
        transport
            .expect_exists()
            .with(eq(format!("{BASE}/user-card/user-card.hpx")))
            .times(1)
            .returning(|_| Ok(true));

        let loader = loader(transport, config_with(vec![]));
        let resolved = loader.resolve_location("user-card.hpx").await.unwrap();
        assert_eq!(
            resolved,
            ResolvedPath {
                path: format!("{BASE}/user-card/user-card.hpx"),
                is_nested: true
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_flat() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));

        let loader = loader(transport, config_with(vec![]));
        let resolved = loader.resolve_location("user-card.hpx").await.unwrap();
        assert_eq!(resolved.path, format!("{BASE}/user-card.hpx"));
        assert!(!resolved.is_nested);
    }

    #[tokio::test]
    async fn test_resolve_treats_probe_errors_as_absent() {
        let mut transport = MockTransport::new();
        transport
            .expect_exists()
            .returning(|url| Err(TransportError::InvalidLocation(url.to_string())));

        let loader = loader(transport, config_with(vec![]));
        assert!(!loader.resolve_location("user-card").await.unwrap().is_nested);
    }

    #[tokio::test]
    async fn test_load_merges_scoped_external_styles() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport.expect_get().returning(|url| {
            Ok(if url.ends_with(".hpx") {
                FetchResponse::ok("<template><style>p { color: blue; }</style><p>{{ text }}</p></template>")
            } else {
                FetchResponse::ok("p { color: red; }")
            })
        });

        let loader = loader(transport, config_with(vec![]));
        assert!(loader.load("UserCard").await);
        assert_eq!(
            loader.registry().get_template("user-card").as_deref(),
            Some("<style>\n.usercard p { color: red; }\n\np { color: blue; }\n</style><p>{{ text }}</p>")
        );
    }

    #[tokio::test]
    async fn test_load_without_stylesheet() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport.expect_get().returning(|url| {
            Ok(if url.ends_with(".css") {
                FetchResponse::not_found()
            } else {
                FetchResponse::ok("<template><div>{{name}}</div></template>")
            })
        });

        let loader = loader(transport, config_with(vec![]));
        assert_eq!(loader.try_load("UserCard.hpx").await.unwrap(), "user-card");
        assert_eq!(
            loader.registry().get_template("user-card").as_deref(),
            Some("<div>{{name}}</div>")
        );
    }

    #[tokio::test]
    async fn test_load_missing_source_fails() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport.expect_get().returning(|_| Ok(FetchResponse::not_found()));

        let loader = loader(transport, config_with(vec![]));
        assert!(matches!(
            loader.try_load("user-card").await,
            Err(LoadError::NotFound(path)) if path == format!("{BASE}/user-card.hpx")
        ));
        assert!(!loader.load("user-card").await);
        assert!(loader.registry().is_empty());
    }

    #[tokio::test]
    async fn test_load_stylesheet_server_error_fails() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport.expect_get().returning(|url| {
            Ok(if url.ends_with(".css") {
                FetchResponse {
                    status: http::StatusCode::INTERNAL_SERVER_ERROR,
                    body: String::new(),
                }
            } else {
                FetchResponse::ok("<template><p></p></template>")
            })
        });

        let loader = loader(transport, config_with(vec![]));
        assert!(matches!(
            loader.try_load("user-card").await,
            Err(LoadError::Status { status, .. }) if status == http::StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn test_load_invalid_name_fails_registration() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport
            .expect_get()
            .returning(|_| Ok(FetchResponse::ok("<template><p></p></template>")));

        let loader = loader(transport, config_with(vec![]));
        assert!(matches!(
            loader.try_load("card").await,
            Err(LoadError::Registration(RegistrationError::InvalidName(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_all_tolerates_partial_failure() {
        let mut transport = MockTransport::new();
        transport.expect_exists().returning(|_| Ok(false));
        transport.expect_get().returning(|url| {
            Ok(if url.ends_with("good-one.hpx") || url.ends_with("also-good.hpx") {
                FetchResponse::ok("<template><p>ok</p></template>")
            } else {
                FetchResponse::not_found()
            })
        });

        let config = config_with(vec![
            ComponentEntry::Name("good-one".into()),
            ComponentEntry::Name("missing-one".into()),
            ComponentEntry::Detailed {
                name: Some("also-good".into()),
                path: None,
                extra: Default::default(),
            },
            ComponentEntry::Detailed {
                name: None,
                path: None,
                extra: Default::default(),
            },
        ]);

        let loader = loader(transport, config);
        let report = loader.load_all().await.unwrap();
        assert_eq!(report.requested, 3);
        let mut loaded = report.loaded.clone();
        loaded.sort();
        assert_eq!(loaded, vec!["also-good".to_string(), "good-one".to_string()]);
        assert_eq!(report.failed, vec!["missing-one".to_string()]);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_load_all_with_no_components() {
        let loader = loader(MockTransport::new(), config_with(vec![]));
        let report = loader.load_all().await.unwrap();
        assert_eq!(report, LoadReport::default());
        assert!(report.is_complete());
    }
}
