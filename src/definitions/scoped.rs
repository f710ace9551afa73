//! Definition attaching a fixed scope to string values.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use super::{require_dependencies, unsupported};
use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::{Attribute, AttributeValue, PluginDependency};

/// Turns every string value into a scoped string with a configured scope.
#[derive(Debug, Clone)]
pub struct ScopedDefinition {
  scope: String,
}

impl ScopedDefinition {
  pub fn new(scope: impl Into<String>) -> Self {
    Self {
      scope: scope.into().trim().to_string(),
    }
  }

  pub fn scope(&self) -> &str {
    &self.scope
  }
}

#[async_trait]
impl AttributeDefinitionLogic for ScopedDefinition {
  fn kind(&self) -> &'static str {
    "scoped"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    let mut attribute = Attribute::new(scope.plugin_id);
    for value in scope.merged_values() {
      match &value {
        AttributeValue::Empty { kind } => {
          debug!(plugin_id = %scope.plugin_id, kind = ?kind, "ignoring empty value");
        }
        AttributeValue::String { value } => {
          attribute
            .values
            .push(AttributeValue::scoped(value.as_str(), self.scope.as_str()));
        }
        other => return Err(unsupported(other)),
      }
    }
    Ok(Some(attribute))
  }

  fn validate(&self, dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    if self.scope.is_empty() {
      return Err("no scope was configured".to_string());
    }
    require_dependencies(dependencies)
  }
}
