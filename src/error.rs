//! Error types for attribute resolution.

use thiserror::Error;

use crate::plugins::ComponentState;

/// Failure reported by the logic of a single attribute definition or data connector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
  #[error("{0}")]
  Failed(String),

  #[error("unsupported value type: expected {expected}, found {found}")]
  UnsupportedValueType {
    expected: &'static str,
    found: &'static str,
  },

  #[error("no result was found")]
  NoResult,

  #[error("multiple results were found")]
  MultipleResults,
}

impl PluginError {
  pub fn failed(reason: impl Into<String>) -> Self {
    PluginError::Failed(reason.into())
  }

  /// Returns false for the "expected" connector outcomes that must not mark a connector as failing.
  pub fn trips_circuit_breaker(&self) -> bool {
    !matches!(self, PluginError::NoResult | PluginError::MultipleResults)
  }
}

/// Errors raised while configuring, initializing or running an attribute resolver.
#[derive(Debug, Error)]
pub enum ResolutionError {
  #[error("component '{id}' is {state}, cannot {operation}")]
  ComponentState {
    id: String,
    state: ComponentState,
    operation: &'static str,
  },

  #[error("plugin '{plugin_id}' failed to resolve: {source}")]
  Plugin {
    plugin_id: String,
    #[source]
    source: PluginError,
  },

  #[error("data connector '{plugin_id}' failed recently and is still inside its retry delay")]
  ConnectorSuppressed { plugin_id: String },

  #[error("duplicate plugin id '{0}'")]
  DuplicatePlugin(String),

  #[error("circular dependency: {}", .cycle.join(" -> "))]
  CircularDependency { cycle: Vec<String> },

  #[error("plugin '{plugin_id}' depends on plugin '{dependency_id}' which does not exist")]
  MissingDependency {
    plugin_id: String,
    dependency_id: String,
  },

  #[error("data connector '{plugin_id}' names failover '{failover_id}' which is not a data connector")]
  UnknownFailover {
    plugin_id: String,
    failover_id: String,
  },

  #[error("plugin '{plugin_id}' is misconfigured: {reason}")]
  InvalidConfiguration { plugin_id: String, reason: String },

  #[error("resolution of '{0}' has already been recorded")]
  AlreadyRecorded(String),

  #[error("resolver invariant violated: {0}")]
  InvariantViolation(String),

  #[error("invalid resolver configuration: {0}")]
  Config(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ResolutionError {
  pub(crate) fn plugin(plugin_id: impl Into<String>, source: PluginError) -> Self {
    ResolutionError::Plugin {
      plugin_id: plugin_id.into(),
      source,
    }
  }

  pub(crate) fn invalid(plugin_id: impl Into<String>, reason: impl Into<String>) -> Self {
    ResolutionError::InvalidConfiguration {
      plugin_id: plugin_id.into(),
      reason: reason.into(),
    }
  }

  /// Id of the plugin this error is about, when there is one.
  pub fn plugin_id(&self) -> Option<&str> {
    match self {
      ResolutionError::ComponentState { id, .. } => Some(id),
      ResolutionError::Plugin { plugin_id, .. }
      | ResolutionError::ConnectorSuppressed { plugin_id }
      | ResolutionError::MissingDependency { plugin_id, .. }
      | ResolutionError::UnknownFailover { plugin_id, .. }
      | ResolutionError::InvalidConfiguration { plugin_id, .. } => Some(plugin_id),
      ResolutionError::DuplicatePlugin(id) | ResolutionError::AlreadyRecorded(id) => Some(id),
      _ => None,
    }
  }

  /// True for errors detected while building or initializing the plugin graph. These are never retried.
  pub fn is_configuration_error(&self) -> bool {
    matches!(
      self,
      ResolutionError::DuplicatePlugin(_)
        | ResolutionError::CircularDependency { .. }
        | ResolutionError::MissingDependency { .. }
        | ResolutionError::UnknownFailover { .. }
        | ResolutionError::InvalidConfiguration { .. }
        | ResolutionError::Config(_)
    )
  }
}
