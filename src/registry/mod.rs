//! External model-registry cross-check.
//!
//! The capability the validator needs is narrow: for a named project,
//! which model names has each team already registered. It sits behind
//! [`ModelRegistry`] so tests stub it without network access; the one
//! real implementation is the blocking Zoltar client in [`zoltar`].

pub mod zoltar;

use std::collections::BTreeMap;

pub use zoltar::ZoltarRegistry;

/// Registered model names grouped by team name.
pub type TeamModels = BTreeMap<String, Vec<String>>;

pub trait ModelRegistry {
    /// Enumerate the models registered under `project`, grouped by
    /// team. A team absent from the map has no registered models.
    fn team_models(&self, project: &str) -> Result<TeamModels, RegistryError>;
}

/// Failure of the registry cross-check. All variants are recoverable:
/// the orchestrator reports them for the affected file and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Environment credentials are not set.
    #[error("registry credentials missing: set {0}")]
    MissingCredentials(&'static str),

    /// The registry rejected the supplied credentials.
    #[error("registry authentication failed: {0}")]
    Authentication(String),

    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The registry returned a non-2xx status.
    #[error("registry {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The configured project does not exist in the registry.
    #[error("project '{0}' not found in the model registry")]
    ProjectNotFound(String),

    /// The HTTP client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
