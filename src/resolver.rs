//! The attribute resolver: owns the plugin graph and evaluates it per request.
//!
//! Evaluation is a depth-first walk from the requested attribute definitions through
//! their dependencies. Every plugin runs at most once per request; its outcome is
//! memoized in a [`WorkContext`] that lives for the duration of one call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::ResolutionError;
use crate::graph_validation::DependencyGraph;
use crate::plugins::{
  AttributeDefinition, ComponentState, DataConnector, Plugin, Resolution, ResolverPlugin,
};
use crate::types::{
  AttributeMap, RequestedAttributes, ResolutionContext, ResolutionStatus, WorkContext,
};

/// Resolves identity attributes over a validated graph of definitions and connectors.
///
/// Build with [`AttributeResolver::new`], call [`AttributeResolver::initialize`] once,
/// then share (e.g. in an `Arc`) across any number of concurrent requests.
#[derive(Debug)]
pub struct AttributeResolver {
  id: String,
  definitions: BTreeMap<String, Arc<AttributeDefinition>>,
  connectors: BTreeMap<String, Arc<DataConnector>>,
  plugins: BTreeMap<String, ResolverPlugin>,
  evaluation_order: Vec<String>,
  state: ComponentState,
}

impl AttributeResolver {
  /// Registers the plugins. Ids must be unique across definitions and connectors.
  pub fn new(
    id: impl Into<String>,
    definitions: Vec<AttributeDefinition>,
    connectors: Vec<DataConnector>,
  ) -> Result<Self, ResolutionError> {
    let id = id.into();
    let mut resolver = Self {
      id,
      definitions: BTreeMap::new(),
      connectors: BTreeMap::new(),
      plugins: BTreeMap::new(),
      evaluation_order: Vec::new(),
      state: ComponentState::Unconfigured,
    };
    for definition in definitions {
      let plugin_id = definition.id().to_string();
      if resolver.definitions.contains_key(&plugin_id) {
        return Err(ResolutionError::DuplicatePlugin(plugin_id));
      }
      resolver.definitions.insert(plugin_id, Arc::new(definition));
    }
    for connector in connectors {
      let plugin_id = connector.id().to_string();
      if resolver.connectors.contains_key(&plugin_id) || resolver.definitions.contains_key(&plugin_id)
      {
        return Err(ResolutionError::DuplicatePlugin(plugin_id));
      }
      resolver.connectors.insert(plugin_id, Arc::new(connector));
    }
    Ok(resolver)
  }

  /// Resolver id, used as the `resolver_id` log field.
  pub fn id(&self) -> &str {
    &self.id
  }

  /// Lifecycle state of the resolver itself.
  pub fn state(&self) -> ComponentState {
    self.state
  }

  /// Attribute definition registered under `id`.
  pub fn attribute_definition(&self, id: &str) -> Option<&Arc<AttributeDefinition>> {
    self.definitions.get(id)
  }

  /// Data connector registered under `id`.
  pub fn data_connector(&self, id: &str) -> Option<&Arc<DataConnector>> {
    self.connectors.get(id)
  }

  /// Attribute definitions in id order.
  pub fn attribute_definitions(&self) -> impl Iterator<Item = &Arc<AttributeDefinition>> {
    self.definitions.values()
  }

  /// Data connectors in id order.
  pub fn data_connectors(&self) -> impl Iterator<Item = &Arc<DataConnector>> {
    self.connectors.values()
  }

  /// Plugin ids with every plugin after its dependencies. Empty until initialized.
  pub fn evaluation_order(&self) -> &[String] {
    &self.evaluation_order
  }

  /// Initializes every plugin and validates the dependency graph.
  ///
  /// Dangling dependencies, unknown failovers and cycles fail here, never at request time.
  /// Calling it again on an initialized resolver is a no-op.
  #[instrument(level = "trace", skip(self), fields(resolver_id = %self.id))]
  pub fn initialize(&mut self) -> Result<(), ResolutionError> {
    match self.state {
      ComponentState::Initialized => return Ok(()),
      ComponentState::Destroyed => {
        return Err(ResolutionError::ComponentState {
          id: self.id.clone(),
          state: self.state,
          operation: "initialize",
        });
      }
      ComponentState::Unconfigured => {}
    }

    let mut plugins = BTreeMap::new();
    for (id, definition) in self.definitions.iter_mut() {
      unique(definition, id)?.initialize()?;
      plugins.insert(id.clone(), ResolverPlugin::Definition(Arc::clone(definition)));
    }
    for (id, connector) in self.connectors.iter_mut() {
      unique(connector, id)?.initialize()?;
      plugins.insert(id.clone(), ResolverPlugin::Connector(Arc::clone(connector)));
    }

    let graph = DependencyGraph::from_plugins(&plugins)?;
    self.evaluation_order = graph.topological_order()?;
    self.plugins = plugins;
    self.state = ComponentState::Initialized;
    info!(
      resolver_id = %self.id,
      definitions = self.definitions.len(),
      connectors = self.connectors.len(),
      "attribute resolver initialized"
    );
    Ok(())
  }

  /// Destroys the resolver and every plugin it solely owns. Idempotent.
  pub fn destroy(&mut self) {
    if self.state == ComponentState::Destroyed {
      return;
    }
    self.plugins.clear();
    self.evaluation_order.clear();
    for (id, definition) in self.definitions.iter_mut() {
      match Arc::get_mut(definition) {
        Some(definition) => definition.destroy(),
        None => warn!(resolver_id = %self.id, plugin_id = %id, "attribute definition still shared, not destroyed"),
      }
    }
    for (id, connector) in self.connectors.iter_mut() {
      match Arc::get_mut(connector) {
        Some(connector) => connector.destroy(),
        None => warn!(resolver_id = %self.id, plugin_id = %id, "data connector still shared, not destroyed"),
      }
    }
    self.state = ComponentState::Destroyed;
    debug!(resolver_id = %self.id, "attribute resolver destroyed");
  }

  fn ensure_usable(&self) -> Result<(), ResolutionError> {
    match self.state {
      ComponentState::Initialized => Ok(()),
      state => Err(ResolutionError::ComponentState {
        id: self.id.clone(),
        state,
        operation: "resolve",
      }),
    }
  }

  /// Resolves the requested attributes and stores them in `context.resolved_attributes`.
  ///
  /// All or nothing: when an error propagates, `context` is left untouched.
  #[instrument(level = "trace", skip(self, context), fields(resolver_id = %self.id, request_id = %context.request_id))]
  pub async fn resolve_attributes(
    &self,
    context: &mut ResolutionContext,
  ) -> Result<(), ResolutionError> {
    let work = self.resolve_work_context(context).await?;
    let resolved = self.finalize(&work);
    info!(
      resolver_id = %self.id,
      request_id = %context.request_id,
      attributes = resolved.len(),
      "resolved attributes"
    );
    context.resolved_attributes = resolved;
    Ok(())
  }

  /// Runs the walk for `context` and returns the per-plugin outcomes without assembling results.
  pub async fn resolve_work_context(
    &self,
    context: &ResolutionContext,
  ) -> Result<WorkContext, ResolutionError> {
    self.ensure_usable()?;
    let mut work = WorkContext::new();
    for id in self.roots(&context.requested) {
      self.ensure_resolved(id, context, &mut work).await?;
    }
    Ok(work)
  }

  fn roots<'a>(&'a self, requested: &'a RequestedAttributes) -> Vec<&'a str> {
    match requested {
      RequestedAttributes::All => self
        .definitions
        .values()
        .filter(|d| !d.is_dependency_only())
        .map(|d| d.id())
        .collect(),
      RequestedAttributes::Only(ids) => ids
        .iter()
        .filter(|id| {
          let known = self.definitions.contains_key(id.as_str());
          if !known {
            debug!(resolver_id = %self.id, attribute_id = %id, "no attribute definition for requested attribute");
          }
          known
        })
        .map(String::as_str)
        .collect(),
    }
  }

  /// Ensures `id` has a terminal outcome in `work`, resolving its dependencies first.
  fn ensure_resolved<'a>(
    &'a self,
    id: &'a str,
    context: &'a ResolutionContext,
    work: &'a mut WorkContext,
  ) -> BoxFuture<'a, Result<(), ResolutionError>> {
    Box::pin(async move {
      match work.status(id) {
        status if status.is_terminal() => {
          trace!(plugin_id = %id, status = %status, "already resolved");
          return Ok(());
        }
        ResolutionStatus::InProgress => {
          return Err(ResolutionError::InvariantViolation(format!(
            "plugin '{}' depends on itself at request time",
            id
          )));
        }
        _ => {}
      }

      let result = match self.plugins.get(id) {
        Some(ResolverPlugin::Definition(definition)) => {
          self.resolve_definition(definition, context, work).await
        }
        Some(ResolverPlugin::Connector(connector)) => {
          self.resolve_connector(connector, context, work).await
        }
        None => {
          return Err(ResolutionError::InvariantViolation(format!(
            "plugin '{}' is not registered",
            id
          )));
        }
      };
      if let Err(error) = &result {
        if work.status(id) == ResolutionStatus::InProgress {
          work.record_failed(id, error.to_string())?;
        }
      }
      result
    })
  }

  fn resolve_dependencies<'a>(
    &'a self,
    plugin: &'a dyn Plugin,
    context: &'a ResolutionContext,
    work: &'a mut WorkContext,
  ) -> BoxFuture<'a, Result<(), ResolutionError>> {
    Box::pin(async move {
      for dependency in plugin.dependencies() {
        self
          .ensure_resolved(&dependency.plugin_id, context, work)
          .await?;
      }
      Ok(())
    })
  }

  fn resolve_definition<'a>(
    &'a self,
    definition: &'a Arc<AttributeDefinition>,
    context: &'a ResolutionContext,
    work: &'a mut WorkContext,
  ) -> BoxFuture<'a, Result<(), ResolutionError>> {
    Box::pin(async move {
      work.mark_in_progress(definition.id())?;
      self
        .resolve_dependencies(definition.as_ref(), context, work)
        .await?;

      trace!(plugin_id = %definition.id(), "resolving attribute definition");
      match definition.resolve(context, work).await? {
        Resolution::Produced(attribute) => {
          work.record_attribute_definition(Arc::clone(definition), attribute)
        }
        Resolution::Skipped => work.record_skipped(definition.id()),
        Resolution::Failed(error) => work.record_failed(definition.id(), error.to_string()),
      }
    })
  }

  fn resolve_connector<'a>(
    &'a self,
    connector: &'a Arc<DataConnector>,
    context: &'a ResolutionContext,
    work: &'a mut WorkContext,
  ) -> BoxFuture<'a, Result<(), ResolutionError>> {
    Box::pin(async move {
      let id = connector.id();
      work.mark_in_progress(id)?;

      self
        .resolve_dependencies(connector.as_ref(), context, work)
        .await?;
      if !connector.is_active(context) {
        debug!(plugin_id = %id, "activation condition not met, skipping data connector");
        return work.record_skipped(id);
      }

      let failure = if connector.is_suppressed(Utc::now()) {
        debug!(plugin_id = %id, last_fail = ?connector.last_fail(), "data connector failed recently, still waiting");
        ResolutionError::ConnectorSuppressed {
          plugin_id: id.to_string(),
        }
      } else {
        trace!(plugin_id = %id, "resolving data connector");
        match connector.resolve(context, work).await {
          Ok(Resolution::Produced(attributes)) => {
            return work.record_data_connector(Arc::clone(connector), attributes);
          }
          Ok(Resolution::Skipped) => return work.record_skipped(id),
          Ok(Resolution::Failed(error)) => error,
          Err(error @ ResolutionError::Plugin { .. }) => error,
          Err(error) => return Err(error),
        }
      };
      self
        .handle_connector_failure(connector, failure, context, work)
        .await
    })
  }

  /// Substitutes the failover connector's output when it resolves; otherwise applies
  /// the failed connector's own error policy.
  fn handle_connector_failure<'a>(
    &'a self,
    connector: &'a Arc<DataConnector>,
    failure: ResolutionError,
    context: &'a ResolutionContext,
    work: &'a mut WorkContext,
  ) -> BoxFuture<'a, Result<(), ResolutionError>> {
    Box::pin(async move {
      let id = connector.id();
      if let Some(failover_id) = connector.failover_connector_id() {
        debug!(plugin_id = %id, failover_id = %failover_id, error = %failure, "invoking failover data connector");
        match self.ensure_resolved(failover_id, context, work).await {
          Ok(()) => {}
          Err(error @ (ResolutionError::Plugin { .. } | ResolutionError::ConnectorSuppressed { .. })) => {
            debug!(plugin_id = %id, failover_id = %failover_id, error = %error, "failover data connector failed");
          }
          Err(error) => return Err(error),
        }
        if work.status(failover_id) == ResolutionStatus::Succeeded {
          return work.record_failover(Arc::clone(connector), failover_id);
        }
      }

      if connector.propagate_errors() {
        return Err(failure);
      }
      debug!(plugin_id = %id, error = %failure, "ignoring data connector failure");
      work.record_failed(id, failure.to_string())
    })
  }

  /// Collects released attributes: resolved, not dependency-only, with at least one value.
  /// Values are de-duplicated keeping their first occurrence.
  fn finalize(&self, work: &WorkContext) -> AttributeMap {
    let mut released = AttributeMap::new();
    for resolved in work.resolved_attribute_definitions() {
      let id = resolved.id();
      if resolved.is_dependency_only() {
        trace!(plugin_id = %id, "dependency-only attribute is not released");
        continue;
      }
      let Some(attribute) = resolved.resolved_attribute() else {
        continue;
      };
      if attribute.values.is_empty() {
        debug!(plugin_id = %id, "attribute has no values, not released");
        continue;
      }
      let mut attribute = attribute.clone();
      let removed = attribute.dedup_values();
      if removed > 0 {
        trace!(plugin_id = %id, removed, "removed duplicate values");
      }
      released.insert(attribute.id.clone(), attribute);
    }
    released
  }
}

fn unique<'a, T>(plugin: &'a mut Arc<T>, id: &str) -> Result<&'a mut T, ResolutionError> {
  Arc::get_mut(plugin).ok_or_else(|| {
    ResolutionError::InvariantViolation(format!(
      "plugin '{}' is shared before the resolver was initialized",
      id
    ))
  })
}
