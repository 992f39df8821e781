//! Error types and error handling
//!
//! Each module carries its own error enum; [`HyperxError`] aggregates them
//! for the operations that are allowed to fail loudly, mainly
//! [`HyperxState::initialize`](crate::state::HyperxState::initialize).

use thiserror::Error;

use crate::components::{ElementRenderError, LoadError, RegistrationError, TransportError};
use crate::config::ConfigError;
use crate::host::HostError;
use crate::jrx::JrxError;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum HyperxError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A component failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A component could not be registered
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A component element failed to render
    #[error(transparent)]
    Render(#[from] ElementRenderError),

    /// A JSON response could not be rendered
    #[error(transparent)]
    Json(#[from] JrxError),

    /// The attribute processor failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// A request could not be completed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Some configured components did not load
    #[error("Only {loaded}/{requested} components loaded (failed: {})", failed.join(", "))]
    PartialLoad {
        /// Number of components registered
        loaded: usize,
        /// Number of components attempted
        requested: usize,
        /// Names of the components that failed
        failed: Vec<String>,
    },
}

/// Result alias using [`HyperxError`]
pub type Result<T, E = HyperxError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_load_message() {
        let err = HyperxError::PartialLoad {
            loaded: 1,
            requested: 3,
            failed: vec!["nav-bar".into(), "user-card".into()],
        };
        assert_eq!(
            err.to_string(),
            "Only 1/3 components loaded (failed: nav-bar, user-card)"
        );
    }

    #[test]
    fn test_conversions_are_transparent() {
        let err: HyperxError = RegistrationError::InvalidName("card".into()).into();
        assert!(matches!(err, HyperxError::Registration(_)));
        assert_eq!(err.to_string(), RegistrationError::InvalidName("card".into()).to_string());

        let err: HyperxError = LoadError::NotFound("/components/x.hpx".into()).into();
        assert_eq!(err.to_string(), "component file not found at: /components/x.hpx");
    }
}
