//! Definition translating values through value maps.

use std::collections::BTreeSet;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, trace};

use super::{full_match, require_dependencies, unsupported};
use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::{Attribute, AttributeValue, PluginDependency};

/// A source value a [`ValueMap`] matches against.
#[derive(Debug, Clone)]
pub enum SourceValue {
  /// Regular expression that must match the whole value. Its captures may be
  /// referenced from the return value as `$1` or `${1}`.
  Pattern(Regex),
  /// Matches any value containing the substring.
  Partial(String),
}

impl SourceValue {
  pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
    full_match(pattern).map(SourceValue::Pattern)
  }

  pub fn partial(substring: impl Into<String>) -> Self {
    SourceValue::Partial(substring.into())
  }

  fn map(&self, value: &str, return_value: &str) -> Option<String> {
    match self {
      SourceValue::Pattern(regex) => regex
        .is_match(value)
        .then(|| regex.replace(value, return_value).into_owned()),
      SourceValue::Partial(substring) => value
        .contains(substring.as_str())
        .then(|| return_value.to_string()),
    }
  }
}

/// Maps any value matching one of `source_values` to `return_value`.
#[derive(Debug, Clone)]
pub struct ValueMap {
  pub return_value: String,
  pub source_values: Vec<SourceValue>,
}

impl ValueMap {
  pub fn new(return_value: impl Into<String>, source_values: Vec<SourceValue>) -> Self {
    Self {
      return_value: return_value.into(),
      source_values,
    }
  }

  /// Distinct mapped values for `value`, in source value order.
  pub fn apply(&self, value: &str) -> Vec<String> {
    let mut mapped: Vec<String> = Vec::new();
    for result in self
      .source_values
      .iter()
      .filter_map(|source| source.map(value, &self.return_value))
    {
      if !mapped.contains(&result) {
        mapped.push(result);
      }
    }
    mapped
  }
}

/// Replaces each input value by the results of every value map it matches.
///
/// Unmatched values pass through unchanged when `pass_thru` is set, otherwise map
/// to the default value if one is configured. With no input values at all the
/// default value is released on its own.
#[derive(Debug, Clone, Default)]
pub struct MappedDefinition {
  value_maps: Vec<ValueMap>,
  default_value: Option<String>,
  pass_thru: bool,
}

impl MappedDefinition {
  pub fn new(value_maps: Vec<ValueMap>) -> Self {
    Self {
      value_maps,
      default_value: None,
      pass_thru: false,
    }
  }

  pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
    let default_value = default_value.into().trim().to_string();
    self.default_value = (!default_value.is_empty()).then_some(default_value);
    self
  }

  pub fn with_pass_thru(mut self, pass_thru: bool) -> Self {
    self.pass_thru = pass_thru;
    self
  }

  pub fn default_value(&self) -> Option<&str> {
    self.default_value.as_deref()
  }

  pub fn is_pass_thru(&self) -> bool {
    self.pass_thru
  }

  fn map_value(&self, value: &str) -> Vec<String> {
    if value.is_empty() {
      return vec![];
    }
    let mut mapped: Vec<String> = self
      .value_maps
      .iter()
      .flat_map(|map| map.apply(value))
      .collect();
    if mapped.is_empty() {
      if self.pass_thru {
        mapped.push(value.to_string());
      } else if let Some(default) = &self.default_value {
        mapped.push(default.clone());
      }
    }
    mapped
  }
}

#[async_trait]
impl AttributeDefinitionLogic for MappedDefinition {
  fn kind(&self) -> &'static str {
    "mapped"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    let mut attribute = Attribute::new(scope.plugin_id);
    let unmapped = scope.merged_values();
    if unmapped.is_empty() {
      if let Some(default) = &self.default_value {
        debug!(plugin_id = %scope.plugin_id, default = %default, "no input values, releasing default value");
        attribute.values.push(AttributeValue::string(default.as_str()));
      }
      return Ok(Some(attribute));
    }

    for value in &unmapped {
      let mapped = match value {
        AttributeValue::Empty { .. } => vec![],
        AttributeValue::String { value } => self.map_value(value),
        other => return Err(unsupported(other)),
      };
      trace!(plugin_id = %scope.plugin_id, input = %value, mapped = ?mapped, "mapped value");
      attribute
        .values
        .extend(mapped.into_iter().map(AttributeValue::string));
    }
    Ok(Some(attribute))
  }

  fn validate(&self, dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    require_dependencies(dependencies)?;
    if self.value_maps.is_empty() {
      return Err("no value mappings were configured".to_string());
    }
    Ok(())
  }
}
