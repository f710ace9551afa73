//! Per-request memoization table: which plugins ran and what they produced.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{trace, warn};

use super::{
  Attribute, AttributeMap, AttributeValue, PluginDependency, ResolutionOutcome, ResolutionStatus,
};
use crate::error::ResolutionError;
use crate::plugins::{
  AttributeDefinition, DataConnector, Plugin, ResolvedAttributeDefinition, ResolvedDataConnector,
  ResolvedPlugin,
};

/// Intermediate results of one resolution request, keyed by plugin id.
///
/// Each plugin is recorded at most once; a second terminal record for the same id
/// is an [`ResolutionError::AlreadyRecorded`] error.
#[derive(Debug, Default)]
pub struct WorkContext {
  outcomes: HashMap<String, ResolutionOutcome>,
  completed: Vec<String>,
}

impl WorkContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn status(&self, plugin_id: &str) -> ResolutionStatus {
    self
      .outcomes
      .get(plugin_id)
      .map(ResolutionOutcome::status)
      .unwrap_or(ResolutionStatus::NotStarted)
  }

  pub fn outcome(&self, plugin_id: &str) -> Option<&ResolutionOutcome> {
    self.outcomes.get(plugin_id)
  }

  /// Plugin ids in the order their resolution finished.
  pub fn completed(&self) -> &[String] {
    &self.completed
  }

  pub(crate) fn mark_in_progress(&mut self, plugin_id: &str) -> Result<(), ResolutionError> {
    match self.status(plugin_id) {
      ResolutionStatus::NotStarted => {
        self
          .outcomes
          .insert(plugin_id.to_string(), ResolutionOutcome::InProgress);
        Ok(())
      }
      ResolutionStatus::InProgress => Err(ResolutionError::InvariantViolation(format!(
        "plugin '{}' was re-entered while in progress",
        plugin_id
      ))),
      _ => Err(ResolutionError::AlreadyRecorded(plugin_id.to_string())),
    }
  }

  fn finish(&mut self, plugin_id: String, outcome: ResolutionOutcome) -> Result<(), ResolutionError> {
    if self.status(&plugin_id).is_terminal() {
      return Err(ResolutionError::AlreadyRecorded(plugin_id));
    }
    trace!(plugin_id = %plugin_id, status = %outcome.status(), "recording outcome");
    self.completed.push(plugin_id.clone());
    self.outcomes.insert(plugin_id, outcome);
    Ok(())
  }

  pub fn record_attribute_definition(
    &mut self,
    definition: Arc<AttributeDefinition>,
    attribute: Option<Attribute>,
  ) -> Result<(), ResolutionError> {
    let id = definition.id().to_string();
    let resolved = ResolvedAttributeDefinition::new(definition, attribute)?;
    self.finish(
      id,
      ResolutionOutcome::Succeeded(ResolvedPlugin::Definition(resolved)),
    )
  }

  pub fn record_data_connector(
    &mut self,
    connector: Arc<DataConnector>,
    attributes: Option<AttributeMap>,
  ) -> Result<(), ResolutionError> {
    let id = connector.id().to_string();
    self.finish(
      id,
      ResolutionOutcome::Succeeded(ResolvedPlugin::Connector(ResolvedDataConnector::new(
        connector, attributes,
      ))),
    )
  }

  /// Records the output of the already-resolved `failover_id` connector under the failed connector's id.
  pub fn record_failover(
    &mut self,
    failed: Arc<DataConnector>,
    failover_id: &str,
  ) -> Result<(), ResolutionError> {
    let attributes = match self.resolved_data_connector(failover_id) {
      Some(resolved) => resolved.resolved_attributes().cloned(),
      None => {
        return Err(ResolutionError::InvariantViolation(format!(
          "resolution of failover connector '{}' was not recorded",
          failover_id
        )));
      }
    };
    let id = failed.id().to_string();
    self.finish(
      id,
      ResolutionOutcome::Succeeded(ResolvedPlugin::Connector(ResolvedDataConnector::failed_over(
        failed,
        failover_id,
        attributes,
      ))),
    )
  }

  pub fn record_failed(
    &mut self,
    plugin_id: &str,
    reason: impl Into<String>,
  ) -> Result<(), ResolutionError> {
    self.finish(
      plugin_id.to_string(),
      ResolutionOutcome::Failed {
        reason: reason.into(),
      },
    )
  }

  pub fn record_skipped(&mut self, plugin_id: &str) -> Result<(), ResolutionError> {
    self.finish(plugin_id.to_string(), ResolutionOutcome::Skipped)
  }

  pub fn resolved_attribute_definition(&self, plugin_id: &str) -> Option<&ResolvedAttributeDefinition> {
    match self.outcomes.get(plugin_id) {
      Some(ResolutionOutcome::Succeeded(ResolvedPlugin::Definition(d))) => Some(d),
      _ => None,
    }
  }

  /// Resolved attribute definitions in completion order.
  pub fn resolved_attribute_definitions(&self) -> impl Iterator<Item = &ResolvedAttributeDefinition> {
    self
      .completed
      .iter()
      .filter_map(|id| self.resolved_attribute_definition(id))
  }

  pub fn resolved_data_connector(&self, plugin_id: &str) -> Option<&ResolvedDataConnector> {
    match self.outcomes.get(plugin_id) {
      Some(ResolutionOutcome::Succeeded(ResolvedPlugin::Connector(c))) => Some(c),
      _ => None,
    }
  }

  /// Values of every dependency merged into one list.
  ///
  /// Attribute definition dependencies contribute their attribute; data connector
  /// dependencies contribute the qualified attribute, or every attribute when the
  /// dependency is unqualified. Producers that failed, were skipped or produced
  /// nothing contribute no values.
  pub fn merged_values(
    &self,
    dependencies: &BTreeSet<PluginDependency>,
    definition_id: &str,
  ) -> Vec<AttributeValue> {
    let mut values = Vec::new();
    for dependency in dependencies {
      let plugin_id = dependency.plugin_id.as_str();
      if let Some(definition) = self.resolved_attribute_definition(plugin_id) {
        match dependency.attribute_id.as_deref() {
          Some(attr) if attr != plugin_id => warn!(
            plugin_id = %definition_id,
            source_attribute = %attr,
            dependency = %plugin_id,
            "source attribute differs from attribute definition dependency, using the definition's attribute"
          ),
          _ => {}
        }
        if let Some(attribute) = definition.resolved_attribute() {
          values.extend(attribute.values.iter().cloned());
        }
        continue;
      }
      if let Some(attributes) = self
        .resolved_data_connector(plugin_id)
        .and_then(ResolvedDataConnector::resolved_attributes)
      {
        match dependency.attribute_id.as_deref() {
          Some(attr) => {
            if let Some(attribute) = attributes.get(attr) {
              values.extend(attribute.values.iter().cloned());
            }
          }
          None => {
            for attribute in attributes.values() {
              values.extend(attribute.values.iter().cloned());
            }
          }
        }
      }
    }
    values
  }

  /// Values of every dependency grouped by attribute id.
  pub fn all_values(
    &self,
    dependencies: &BTreeSet<PluginDependency>,
  ) -> BTreeMap<String, Vec<AttributeValue>> {
    let mut result: BTreeMap<String, Vec<AttributeValue>> = BTreeMap::new();
    let mut add = |attribute: &Attribute| {
      result
        .entry(attribute.id.clone())
        .or_default()
        .extend(attribute.values.iter().cloned());
    };
    for dependency in dependencies {
      let plugin_id = dependency.plugin_id.as_str();
      if let Some(definition) = self.resolved_attribute_definition(plugin_id) {
        if let Some(attribute) = definition.resolved_attribute() {
          add(attribute);
        }
        continue;
      }
      if let Some(attributes) = self
        .resolved_data_connector(plugin_id)
        .and_then(ResolvedDataConnector::resolved_attributes)
      {
        match dependency.attribute_id.as_deref() {
          Some(attr) => {
            if let Some(attribute) = attributes.get(attr) {
              add(attribute);
            }
          }
          None => attributes.values().for_each(&mut add),
        }
      }
    }
    result
  }
}
