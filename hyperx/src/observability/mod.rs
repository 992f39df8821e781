//! Observability (structured logging)
//!
//! All diagnostics in hyperx go through `tracing`. Applications that do not
//! install their own subscriber can call [`init`].

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the default configuration
///
/// Sets up:
/// - Pretty formatting in debug builds, JSON in release builds
/// - Environment-based filtering via `RUST_LOG`
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use hyperx::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    init_with(&ObservabilityConfig::default())
}

/// Initialize logging with an explicit configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    tracing::debug!(service = %config.service_name, "Logging initialized");
    Ok(())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Emit JSON lines instead of pretty output
    pub json: bool,

    /// Filter used when `RUST_LOG` is unset
    pub filter: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "hyperx".to_string(),
            json: !cfg!(debug_assertions),
            filter: None,
        }
    }
}

impl ObservabilityConfig {
    /// Create new observability config
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Force JSON output
    #[must_use]
    pub const fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Force pretty output
    #[must_use]
    pub const fn with_pretty(mut self) -> Self {
        self.json = false;
        self
    }

    /// Override the fallback filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is unset
    #[must_use]
    pub fn default_filter(&self) -> String {
        self.filter.clone().unwrap_or_else(|| {
            if cfg!(debug_assertions) {
                "debug,hyperx=trace".to_string()
            } else {
                "info".to_string()
            }
        })
    }
}
