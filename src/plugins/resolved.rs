//! Frozen results of plugins that already ran in the current request.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{ActivationCondition, AttributeDefinition, ComponentState, DataConnector, Plugin};
use crate::error::ResolutionError;
use crate::types::{
  Attribute, AttributeEncoder, AttributeMap, LocalizedStrings, PluginDependency, ResolutionContext,
};

fn ensure_resolvable(plugin: &dyn Plugin) -> Result<(), ResolutionError> {
  if plugin.is_initialized() && !plugin.is_destroyed() {
    return Ok(());
  }
  Err(ResolutionError::ComponentState {
    id: plugin.id().to_string(),
    state: plugin.state(),
    operation: "be frozen as resolved",
  })
}

/// An attribute definition that already ran, together with the attribute it produced.
///
/// Resolving it again returns the same attribute without running the definition's logic.
/// It reports itself as initialized and never destroyed, and its mutators do nothing.
#[derive(Debug, Clone)]
pub struct ResolvedAttributeDefinition {
  definition: Arc<AttributeDefinition>,
  attribute: Option<Attribute>,
}

impl ResolvedAttributeDefinition {
  /// Fails unless `definition` is initialized and not destroyed.
  pub fn new(
    definition: Arc<AttributeDefinition>,
    attribute: Option<Attribute>,
  ) -> Result<Self, ResolutionError> {
    ensure_resolvable(definition.as_ref())?;
    Ok(Self {
      definition,
      attribute,
    })
  }

  pub fn definition(&self) -> &Arc<AttributeDefinition> {
    &self.definition
  }

  pub fn resolved_attribute(&self) -> Option<&Attribute> {
    self.attribute.as_ref()
  }

  pub fn resolve(&self, _context: &ResolutionContext) -> Option<Attribute> {
    self.attribute.clone()
  }

  pub fn is_dependency_only(&self) -> bool {
    self.definition.is_dependency_only()
  }

  pub fn display_names(&self) -> &LocalizedStrings {
    self.definition.display_names()
  }

  pub fn display_descriptions(&self) -> &LocalizedStrings {
    self.definition.display_descriptions()
  }

  pub fn encoders(&self) -> &BTreeSet<AttributeEncoder> {
    self.definition.encoders()
  }

  pub fn set_dependency_only(&mut self, _dependency_only: bool) {}

  pub fn set_display_names(&mut self, _names: LocalizedStrings) {}

  pub fn set_display_descriptions(&mut self, _descriptions: LocalizedStrings) {}

  pub fn set_propagate_errors(&mut self, _propagate: bool) {}

  pub fn initialize(&mut self) {}

  pub fn destroy(&mut self) {}
}

impl Plugin for ResolvedAttributeDefinition {
  fn id(&self) -> &str {
    self.definition.id()
  }

  fn dependencies(&self) -> &BTreeSet<PluginDependency> {
    self.definition.dependencies()
  }

  /// Always `None`: a frozen definition is never re-evaluated for activation.
  fn activation_condition(&self) -> Option<&ActivationCondition> {
    None
  }

  fn propagate_errors(&self) -> bool {
    self.definition.propagate_errors()
  }

  fn state(&self) -> ComponentState {
    ComponentState::Initialized
  }

  fn is_initialized(&self) -> bool {
    true
  }

  fn is_destroyed(&self) -> bool {
    false
  }
}

impl PartialEq for ResolvedAttributeDefinition {
  fn eq(&self, other: &Self) -> bool {
    self.id() == other.id()
  }
}

impl Eq for ResolvedAttributeDefinition {}

impl Hash for ResolvedAttributeDefinition {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.definition.hash(state);
  }
}

/// A data connector that already ran, with the attributes it produced.
///
/// When the connector failed over, `attributes` are the failover connector's output.
#[derive(Debug, Clone)]
pub struct ResolvedDataConnector {
  connector: Arc<DataConnector>,
  attributes: Option<AttributeMap>,
  failover_id: Option<String>,
}

impl ResolvedDataConnector {
  pub fn new(connector: Arc<DataConnector>, attributes: Option<AttributeMap>) -> Self {
    Self {
      connector,
      attributes,
      failover_id: None,
    }
  }

  pub fn failed_over(
    connector: Arc<DataConnector>,
    failover_id: impl Into<String>,
    attributes: Option<AttributeMap>,
  ) -> Self {
    Self {
      connector,
      attributes,
      failover_id: Some(failover_id.into()),
    }
  }

  pub fn connector(&self) -> &Arc<DataConnector> {
    &self.connector
  }

  pub fn resolved_attributes(&self) -> Option<&AttributeMap> {
    self.attributes.as_ref()
  }

  /// Id of the connector whose output stands in for this one, if it failed over.
  pub fn failover_id(&self) -> Option<&str> {
    self.failover_id.as_deref()
  }
}

/// A frozen plugin result stored in the work context.
#[derive(Debug, Clone)]
pub enum ResolvedPlugin {
  Definition(ResolvedAttributeDefinition),
  Connector(ResolvedDataConnector),
}
