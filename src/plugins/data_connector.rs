//! Data connectors: plugins fetching a map of raw attributes from an external source.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace};

use super::{
  ActivationCondition, ComponentState, FailureWindow, Plugin, PluginCore, PluginResult,
  Resolution, ResolutionScope,
};
use crate::error::{PluginError, ResolutionError};
use crate::types::{AttributeMap, PluginDependency, ResolutionContext, WorkContext};

/// Fetching logic of a data connector.
#[async_trait]
pub trait DataConnectorLogic: Send + Sync + 'static {
  fn kind(&self) -> &'static str;

  async fn resolve_connector(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<AttributeMap>, PluginError>;

  fn validate(&self, _dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    Ok(())
  }
}

/// A plugin producing a map of attributes, with an optional failover connector and a circuit breaker.
pub struct DataConnector {
  core: PluginCore,
  failover_connector_id: Option<String>,
  failure_window: FailureWindow,
  logic: Box<dyn DataConnectorLogic>,
}

impl DataConnector {
  /// Unconfigured connector running `logic`.
  pub fn new(id: impl Into<String>, logic: impl DataConnectorLogic) -> Self {
    Self {
      core: PluginCore::new(id),
      failover_connector_id: None,
      failure_window: FailureWindow::default(),
      logic: Box::new(logic),
    }
  }

  /// Kind reported by the logic, e.g. `static`.
  pub fn kind(&self) -> &'static str {
    self.logic.kind()
  }

  /// Connector tried in place of this one when it fails.
  pub fn failover_connector_id(&self) -> Option<&str> {
    self.failover_connector_id.as_deref()
  }

  /// Replaces the dependency set.
  pub fn set_dependencies<I>(&mut self, dependencies: I) -> Result<(), ResolutionError>
  where
    I: IntoIterator<Item = PluginDependency>,
  {
    self.core.set_dependencies(dependencies)
  }

  /// Adds one dependency.
  pub fn add_dependency(&mut self, dependency: PluginDependency) -> Result<(), ResolutionError> {
    self.core.add_dependency(dependency)
  }

  /// Restricts the requests this connector runs for.
  pub fn set_activation_condition(
    &mut self,
    condition: ActivationCondition,
  ) -> Result<(), ResolutionError> {
    self.core.set_activation_condition(condition)
  }

  /// Whether a failure aborts the request.
  pub fn set_propagate_errors(&mut self, propagate: bool) -> Result<(), ResolutionError> {
    self.core.set_propagate_errors(propagate)
  }

  /// Blank ids clear the failover.
  pub fn set_failover_connector_id(
    &mut self,
    failover_id: impl Into<String>,
  ) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    let failover_id = failover_id.into().trim().to_string();
    self.failover_connector_id = (!failover_id.is_empty()).then_some(failover_id);
    Ok(())
  }

  /// How long after a failure the connector is considered still failed. Zero disables the breaker.
  pub fn set_no_retry_delay(&mut self, delay: Duration) -> Result<(), ResolutionError> {
    self.core.ensure_configurable()?;
    self.failure_window.set_no_retry_delay(delay);
    Ok(())
  }

  /// Configured breaker delay.
  pub fn no_retry_delay(&self) -> Duration {
    self.failure_window.no_retry_delay()
  }

  /// Time of the last failure that tripped the breaker.
  pub fn last_fail(&self) -> Option<DateTime<Utc>> {
    self.failure_window.last_fail()
  }

  /// Marks the connector as failed at `at`.
  pub fn record_failure(&self, at: DateTime<Utc>) {
    self.failure_window.record_failure(at);
  }

  /// True when the activation condition, if any, holds for `context`.
  pub fn is_active(&self, context: &ResolutionContext) -> bool {
    self.core.is_active(context)
  }

  /// True while a recent failure suppresses calls to this connector.
  pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
    self.failure_window.is_suppressed(now)
  }

  /// Validates the logic's configuration and freezes the connector. Idempotent.
  pub fn initialize(&mut self) -> Result<(), ResolutionError> {
    if self.core.state() == ComponentState::Initialized {
      return Ok(());
    }
    if self.failover_connector_id.as_deref() == Some(self.core.id()) {
      return Err(ResolutionError::invalid(
        self.core.id(),
        "data connector cannot be its own failover",
      ));
    }
    self
      .logic
      .validate(self.core.dependencies())
      .map_err(|reason| ResolutionError::invalid(self.core.id(), reason))?;
    self.core.initialize()
  }

  /// Deactivates the connector for good.
  pub fn destroy(&mut self) {
    self.core.destroy();
  }

  /// Resolves this connector for one request.
  ///
  /// Failures other than [`PluginError::NoResult`] and [`PluginError::MultipleResults`]
  /// mark the connector as failed for its retry delay.
  #[instrument(level = "trace", skip(self, context, work), fields(plugin_id = %self.core.id()))]
  pub async fn resolve(
    &self,
    context: &ResolutionContext,
    work: &WorkContext,
  ) -> PluginResult<AttributeMap> {
    self.core.ensure_usable()?;
    if !self.core.is_active(context) {
      debug!(plugin_id = %self.id(), "activation condition not met, skipping data connector");
      return Ok(Resolution::Skipped);
    }

    let scope = ResolutionScope::new(self.id(), self.core.dependencies(), context, work);
    match self.logic.resolve_connector(&scope).await {
      Ok(attributes) => {
        match &attributes {
          Some(map) => trace!(
            plugin_id = %self.id(),
            attributes = ?map.keys().collect::<Vec<_>>(),
            "data connector produced attributes"
          ),
          None => debug!(plugin_id = %self.id(), "data connector produced no attributes"),
        }
        Ok(Resolution::Produced(attributes))
      }
      Err(source) => {
        if source.trips_circuit_breaker() {
          self.failure_window.record_failure(Utc::now());
        }
        let error = ResolutionError::plugin(self.id(), source);
        if self.core.propagate_errors() {
          return Err(error);
        }
        debug!(plugin_id = %self.id(), error = %error, "ignoring data connector failure");
        Ok(Resolution::Failed(error))
      }
    }
  }
}

impl Plugin for DataConnector {
  fn id(&self) -> &str {
    self.core.id()
  }

  fn dependencies(&self) -> &BTreeSet<PluginDependency> {
    self.core.dependencies()
  }

  fn activation_condition(&self) -> Option<&ActivationCondition> {
    self.core.activation_condition()
  }

  fn propagate_errors(&self) -> bool {
    self.core.propagate_errors()
  }

  fn state(&self) -> ComponentState {
    self.core.state()
  }
}

impl fmt::Debug for DataConnector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DataConnector")
      .field("id", &self.core.id())
      .field("kind", &self.logic.kind())
      .field("state", &self.core.state())
      .field("dependencies", self.core.dependencies())
      .field("failover_connector_id", &self.failover_connector_id)
      .field("failure_window", &self.failure_window)
      .finish_non_exhaustive()
  }
}

impl PartialEq for DataConnector {
  fn eq(&self, other: &Self) -> bool {
    self.id() == other.id()
  }
}

impl Eq for DataConnector {}

impl Hash for DataConnector {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id().hash(state);
  }
}
