//! Configuration management for hyperx
//!
//! Configuration is read from an `hpxconfig.json` file (camelCase keys) and
//! merged over hardcoded defaults section by section. Sources, lowest
//! priority first:
//!
//! 1. Hardcoded defaults
//! 2. `hpxconfig.json` (or the file passed to [`HyperxConfig::load_from`])
//! 3. An optional TOML overlay (`hyperx.toml`)
//! 4. Environment variables (`HYPERX_` prefix, `__` for nesting)
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "project": {
//!     "name": "Dashboard",
//!     "rootDir": "./",
//!     "componentsDir": "./components"
//!   },
//!   "components": ["user-card", { "name": "sales-chart", "path": "widgets/SalesChart" }],
//!   "loader": { "failOnPartialLoad": true }
//! }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use hyperx::config::HyperxConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut config = HyperxConfig::load_from("./hpxconfig.json")?;
//! config.resolve_paths("https://app.example.com", "/pages");
//!
//! let components_dir = &config.project.components_dir;
//! # Ok(())
//! # }
//! ```

use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::paths::PathResolver;

/// Default configuration file name
pub const CONFIG_FILE: &str = "hpxconfig.json";

/// Optional TOML overlay merged over the JSON file
pub const TOML_OVERLAY: &str = "hyperx.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "HYPERX_";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema
    #[error("Configuration error: {0}")]
    Figment(Box<figment::Error>),

    /// An explicitly requested file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Project metadata and directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Project name
    pub name: String,

    /// Short description
    pub description: String,

    /// Project version
    pub version: String,

    /// Author
    pub author: String,

    /// License identifier
    pub license: String,

    /// Application root, relative or absolute
    pub root_dir: String,

    /// Components directory, relative to `root_dir` unless absolute
    pub components_dir: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: "HyperX App".to_string(),
            description: "A HyperX application".to_string(),
            version: "1.0.0".to_string(),
            author: String::new(),
            license: "MIT".to_string(),
            root_dir: ".".to_string(),
            components_dir: "./components".to_string(),
        }
    }
}

/// Development server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen port
    pub port: u16,

    /// Open a browser on start
    pub open: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            open: true,
        }
    }
}

/// Component loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderSettings {
    /// Component source file extension
    pub extension: String,

    /// Sibling stylesheet extension
    pub style_extension: String,

    /// Treat any failed component in a batch as an initialization failure
    pub fail_on_partial_load: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            extension: "hpx".to_string(),
            style_extension: "css".to_string(),
            fail_on_partial_load: false,
        }
    }
}

/// Attribute names and timings used while rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    /// Attribute carrying a component's JSON data
    pub data_attribute: String,

    /// Attribute whose change forces a re-render
    pub trigger_attribute: String,

    /// Delay before a template proxy fires its `load` trigger
    pub proxy_trigger_delay_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            data_attribute: "data".to_string(),
            trigger_attribute: "trigger".to_string(),
            proxy_trigger_delay_ms: 100,
        }
    }
}

/// A component listed in configuration
///
/// Either a bare name (`"user-card"`) or an object with a name and a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentEntry {
    /// Name doubling as the path
    Name(String),

    /// Explicit name and path; either may stand in for the other
    Detailed {
        /// Component name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,

        /// Path relative to the components directory
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,

        /// Any other keys, kept for host use
        #[serde(flatten)]
        extra: BTreeMap<String, Value>,
    },
}

/// A component entry with both halves filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedComponent {
    /// Component name, used in logs and reports
    pub name: String,

    /// Path handed to the loader
    pub path: String,
}

impl ComponentEntry {
    /// Fill in the missing half; `None` when neither is usable
    #[must_use]
    pub fn normalize(&self) -> Option<NormalizedComponent> {
        let (name, path) = match self {
            Self::Name(name) => (name.trim(), name.trim()),
            Self::Detailed { name, path, .. } => {
                let name = name.as_deref().map(str::trim).filter(|s| !s.is_empty());
                let path = path.as_deref().map(str::trim).filter(|s| !s.is_empty());
                (name.or(path)?, path.or(name)?)
            }
        };
        if name.is_empty() || path.is_empty() {
            return None;
        }
        Some(NormalizedComponent {
            name: name.to_string(),
            path: path.to_string(),
        })
    }
}

/// Complete hyperx configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperxConfig {
    /// Configuration schema version
    pub version: String,

    /// Project settings
    pub project: ProjectSettings,

    /// Development server settings
    pub server: ServerSettings,

    /// Components to load at startup
    pub components: Vec<ComponentEntry>,

    /// Loader settings
    pub loader: LoaderSettings,

    /// Render settings
    pub render: RenderSettings,
}

impl Default for HyperxConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            project: ProjectSettings::default(),
            server: ServerSettings::default(),
            components: Vec::new(),
            loader: LoaderSettings::default(),
            render: RenderSettings::default(),
        }
    }
}

impl HyperxConfig {
    /// Load from `./hpxconfig.json` with the TOML overlay and environment
    ///
    /// Missing files fall through to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a value has
    /// the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(CONFIG_FILE).extract().map_err(ConfigError::from)
    }

    /// Load from a specific file
    ///
    /// Files ending in `.toml` are read as TOML, anything else as JSON. A
    /// missing file yields defaults plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use hyperx::config::HyperxConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = HyperxConfig::load_from("./site/hpxconfig.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::figment(path).extract().map_err(ConfigError::from)
    }

    /// Load a file and resolve its paths, falling back to defaults
    ///
    /// Any failure, including a missing file, is logged once and replaced by
    /// the defaults with `rootDir = base_url` and
    /// `componentsDir = base_url/components`.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>, base_url: &str, current_path: &str) -> Self {
        let path = path.as_ref();
        let loaded = if path.exists() {
            Self::load_from(path)
        } else {
            Err(ConfigError::NotFound(path.display().to_string()))
        };

        match loaded {
            Ok(mut config) => {
                config.resolve_paths(base_url, current_path);
                config
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to load config file, using defaults");
                Self::fallback(base_url)
            }
        }
    }

    /// Defaults rooted at `base_url`
    #[must_use]
    pub fn fallback(base_url: &str) -> Self {
        let mut config = Self::default();
        config.project.root_dir = base_url.to_string();
        config.project.components_dir = PathResolver::join([base_url, "components"]);
        config
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        let path = path.as_ref();
        let figment = Figment::new().merge(Serialized::defaults(Self::default()));
        let figment = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")) {
            figment.merge(Toml::file(path))
        } else {
            let overlay = path.with_file_name(TOML_OVERLAY);
            figment.merge(Json::file(path)).merge(Toml::file(overlay))
        };
        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| env_key_to_path(key.as_str()).into())
                .lowercase(false),
        )
    }

    /// Resolve `rootDir` and `componentsDir` against the page location
    ///
    /// `base_url` is the page origin and `current_path` the directory of the
    /// current page (`/app` for `/app/index.html`). Values starting with
    /// `http` are kept as they are.
    pub fn resolve_paths(&mut self, base_url: &str, current_path: &str) {
        let root = resolve_root_dir(&self.project.root_dir, base_url, current_path);
        let components = resolve_components_dir(&self.project.components_dir, base_url, &root);

        tracing::debug!(
            base_url,
            current_path,
            root_dir = %root,
            components_dir = %components,
            "Config paths resolved"
        );

        self.project.root_dir = root;
        self.project.components_dir = components;
    }

    /// Component entries with both name and path, invalid ones dropped
    #[must_use]
    pub fn normalized_components(&self) -> Vec<NormalizedComponent> {
        self.components.iter().filter_map(ComponentEntry::normalize).collect()
    }
}

fn resolve_root_dir(root_dir: &str, base_url: &str, current_path: &str) -> String {
    if root_dir.starts_with("http") {
        root_dir.to_string()
    } else if root_dir.starts_with('/') {
        PathResolver::join([base_url, root_dir])
    } else if let Some(rest) = root_dir.strip_prefix("./") {
        PathResolver::join([base_url, current_path, rest])
    } else if let Some(rest) = root_dir.strip_prefix("../") {
        PathResolver::join([base_url, PathResolver::parent(current_path), rest])
    } else {
        PathResolver::join([base_url, current_path, root_dir])
    }
}

fn resolve_components_dir(components_dir: &str, base_url: &str, root_dir: &str) -> String {
    if components_dir.starts_with("http") {
        components_dir.to_string()
    } else if components_dir.starts_with('/') {
        PathResolver::join([base_url, components_dir])
    } else if let Some(rest) = components_dir.strip_prefix("./") {
        PathResolver::join([root_dir, rest])
    } else if let Some(rest) = components_dir.strip_prefix("../") {
        PathResolver::join([PathResolver::parent(root_dir), rest])
    } else {
        PathResolver::join([root_dir, components_dir])
    }
}

// HYPERX_PROJECT__COMPONENTS_DIR -> project.componentsDir
fn env_key_to_path(key: &str) -> String {
    key.split("__")
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            let mut upper = false;
            for ch in segment.chars() {
                if ch == '_' {
                    upper = !out.is_empty();
                } else if upper {
                    out.push(ch.to_ascii_uppercase());
                    upper = false;
                } else {
                    out.push(ch.to_ascii_lowercase());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}
