//! Definition splitting `value<delimiter>scope` strings into scoped values.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{require_dependencies, unsupported};
use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::{Attribute, AttributeValue, PluginDependency};

pub const DEFAULT_SCOPE_DELIMITER: &str = "@";

/// Splits each string value at a delimiter into value and scope.
///
/// A value without the delimiter fails the definition.
#[derive(Debug, Clone)]
pub struct PrescopedDefinition {
  delimiter: String,
}

impl Default for PrescopedDefinition {
  fn default() -> Self {
    Self::new(DEFAULT_SCOPE_DELIMITER)
  }
}

impl PrescopedDefinition {
  pub fn new(delimiter: impl Into<String>) -> Self {
    Self {
      delimiter: delimiter.into(),
    }
  }

  pub fn delimiter(&self) -> &str {
    &self.delimiter
  }

  fn split(&self, plugin_id: &str, value: &str) -> Result<AttributeValue, PluginError> {
    let mut parts = value.split(self.delimiter.as_str());
    match (parts.next(), parts.next()) {
      (Some(value), Some(scope)) if !scope.is_empty() => Ok(AttributeValue::scoped(value, scope)),
      _ => {
        warn!(plugin_id = %plugin_id, value = %value, delimiter = %self.delimiter, "value cannot be split");
        Err(PluginError::failed(format!(
          "value '{}' does not contain delimiter '{}'",
          value, self.delimiter
        )))
      }
    }
  }
}

#[async_trait]
impl AttributeDefinitionLogic for PrescopedDefinition {
  fn kind(&self) -> &'static str {
    "prescoped"
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
          attribute.values.push(self.split(scope.plugin_id, value)?);
        }
        other => return Err(unsupported(other)),
      }
    }
    Ok(Some(attribute))
  }

  fn validate(&self, dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    if self.delimiter.is_empty() {
      return Err("scope delimiter must not be empty".to_string());
    }
    require_dependencies(dependencies)
  }
}
