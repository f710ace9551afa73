//! Lifecycle and shared configuration of every resolver plugin.

use std::collections::BTreeSet;
use std::fmt;

use tracing::trace;

use super::ActivationCondition;
use crate::error::ResolutionError;
use crate::types::{PluginDependency, ResolutionContext};

/// Lifecycle state of a plugin or resolver.
///
/// Configuration is only accepted while `Unconfigured`; resolution only while `Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
  Unconfigured,
  Initialized,
  Destroyed,
}

impl fmt::Display for ComponentState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ComponentState::Unconfigured => write!(f, "unconfigured"),
      ComponentState::Initialized => write!(f, "initialized"),
      ComponentState::Destroyed => write!(f, "destroyed"),
    }
  }
}

/// Identity, dependencies, activation condition and error policy common to all plugins.
#[derive(Debug, Clone)]
pub struct PluginCore {
  id: String,
  dependencies: BTreeSet<PluginDependency>,
  activation_condition: Option<ActivationCondition>,
  propagate_errors: bool,
  state: ComponentState,
}

impl PluginCore {
  /// Unconfigured core with a trimmed id, no dependencies and errors propagated.
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into().trim().to_string(),
      dependencies: BTreeSet::new(),
      activation_condition: None,
      propagate_errors: true,
      state: ComponentState::Unconfigured,
    }
  }

  /// Plugin id.
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Current lifecycle state.
  pub fn state(&self) -> ComponentState {
    self.state
  }

  /// Plugins that must resolve first.
  pub fn dependencies(&self) -> &BTreeSet<PluginDependency> {
    &self.dependencies
  }

  /// Predicate gating resolution, if any.
  pub fn activation_condition(&self) -> Option<&ActivationCondition> {
    self.activation_condition.as_ref()
  }

  /// Whether a failure aborts the request.
  pub fn propagate_errors(&self) -> bool {
    self.propagate_errors
  }

  fn state_error(&self, operation: &'static str) -> ResolutionError {
    ResolutionError::ComponentState {
      id: self.id.clone(),
      state: self.state,
      operation,
    }
  }

  /// Fails unless the plugin still accepts configuration.
  pub fn ensure_configurable(&self) -> Result<(), ResolutionError> {
    match self.state {
      ComponentState::Unconfigured => Ok(()),
      _ => Err(self.state_error("change configuration")),
    }
  }

  /// Fails unless the plugin is initialized and not destroyed.
  pub fn ensure_usable(&self) -> Result<(), ResolutionError> {
    match self.state {
      ComponentState::Initialized => Ok(()),
      _ => Err(self.state_error("resolve")),
    }
  }

  /// Replaces the dependency set.
  pub fn set_dependencies<I>(&mut self, dependencies: I) -> Result<(), ResolutionError>
  where
    I: IntoIterator<Item = PluginDependency>,
  {
    self.ensure_configurable()?;
    self.dependencies = dependencies.into_iter().collect();
    Ok(())
  }

  /// Adds one dependency.
  pub fn add_dependency(&mut self, dependency: PluginDependency) -> Result<(), ResolutionError> {
    self.ensure_configurable()?;
    self.dependencies.insert(dependency);
    Ok(())
  }

  /// Sets the predicate gating resolution.
  pub fn set_activation_condition(
    &mut self,
    condition: ActivationCondition,
  ) -> Result<(), ResolutionError> {
    self.ensure_configurable()?;
    self.activation_condition = Some(condition);
    Ok(())
  }

  /// Sets the error policy.
  pub fn set_propagate_errors(&mut self, propagate: bool) -> Result<(), ResolutionError> {
    self.ensure_configurable()?;
    self.propagate_errors = propagate;
    Ok(())
  }

  /// Points every dependency at `attribute_id`. Only valid before the dependency set is frozen.
  pub(crate) fn rebind_dependencies(&mut self, attribute_id: &str) -> Result<(), ResolutionError> {
    self.ensure_configurable()?;
    self.dependencies = std::mem::take(&mut self.dependencies)
      .into_iter()
      .map(|d| d.with_attribute_id(attribute_id))
      .collect();
    Ok(())
  }

  /// Freezes configuration. Calling it again on an initialized plugin is a no-op.
  pub fn initialize(&mut self) -> Result<(), ResolutionError> {
    match self.state {
      ComponentState::Initialized => Ok(()),
      ComponentState::Destroyed => Err(self.state_error("initialize")),
      ComponentState::Unconfigured => {
        if self.id.is_empty() {
          return Err(ResolutionError::invalid("", "plugin id must not be empty"));
        }
        self.state = ComponentState::Initialized;
        trace!(plugin_id = %self.id, dependencies = self.dependencies.len(), "plugin initialized");
        Ok(())
      }
    }
  }

  /// Deactivates the plugin for good and drops its dependencies. Idempotent.
  pub fn destroy(&mut self) {
    if self.state == ComponentState::Destroyed {
      return;
    }
    self.activation_condition = Some(ActivationCondition::never());
    self.dependencies.clear();
    self.state = ComponentState::Destroyed;
    trace!(plugin_id = %self.id, "plugin destroyed");
  }

  /// True when there is no activation condition or it holds for `context`.
  pub fn is_active(&self, context: &ResolutionContext) -> bool {
    self
      .activation_condition
      .as_ref()
      .is_none_or(|c| c.is_met(context))
  }
}
