//! The capability set shared by every resolver plugin.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{ActivationCondition, AttributeDefinition, ComponentState, DataConnector};
use crate::error::ResolutionError;
use crate::types::PluginDependency;

/// A named, dependency-aware unit of attribute resolution.
///
/// Equality of plugins is by [`Plugin::id`]; two instances with the same id are the same node.
pub trait Plugin: Send + Sync {
  fn id(&self) -> &str;

  fn dependencies(&self) -> &BTreeSet<PluginDependency>;

  fn activation_condition(&self) -> Option<&ActivationCondition>;

  /// When false, failures of this plugin are logged and treated as producing nothing.
  fn propagate_errors(&self) -> bool;

  fn state(&self) -> ComponentState;

  fn is_initialized(&self) -> bool {
    self.state() == ComponentState::Initialized
  }

  fn is_destroyed(&self) -> bool {
    self.state() == ComponentState::Destroyed
  }
}

/// What a plugin's `resolve` produced for one request.
#[derive(Debug)]
pub enum Resolution<T> {
  /// Ran and produced a value, or nothing.
  Produced(Option<T>),
  /// Activation condition was false; the plugin did not run.
  Skipped,
  /// Ran and failed, and the failure was swallowed because the plugin does not propagate errors.
  Failed(ResolutionError),
}

impl<T> Resolution<T> {
  pub fn into_value(self) -> Option<T> {
    match self {
      Resolution::Produced(value) => value,
      Resolution::Skipped | Resolution::Failed(_) => None,
    }
  }
}

/// Result of a plugin's `resolve`; `Err` is a failure that must abort the request.
pub type PluginResult<T> = Result<Resolution<T>, ResolutionError>;

/// Either kind of plugin held by the resolver's registry.
#[derive(Debug, Clone)]
pub enum ResolverPlugin {
  Definition(Arc<AttributeDefinition>),
  Connector(Arc<DataConnector>),
}

impl ResolverPlugin {
  pub fn as_plugin(&self) -> &dyn Plugin {
    match self {
      ResolverPlugin::Definition(d) => d.as_ref(),
      ResolverPlugin::Connector(c) => c.as_ref(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      ResolverPlugin::Definition(_) => "attribute definition",
      ResolverPlugin::Connector(_) => "data connector",
    }
  }
}
