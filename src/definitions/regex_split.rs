//! Definition extracting the first capture group of a regular expression.

use std::collections::BTreeSet;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, trace};

use super::{full_match, require_dependencies, unsupported};
use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::{Attribute, AttributeValue, EmptyValue, PluginDependency};

/// Emits capture group 1 of every value the expression matches in full.
#[derive(Debug, Clone)]
pub struct RegexSplitDefinition {
  regex: Regex,
}

impl RegexSplitDefinition {
  pub fn new(pattern: &str) -> Result<Self, regex::Error> {
    Ok(Self {
      regex: full_match(pattern)?,
    })
  }
}

#[async_trait]
impl AttributeDefinitionLogic for RegexSplitDefinition {
  fn kind(&self) -> &'static str {
    "regex_split"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    let mut attribute = Attribute::new(scope.plugin_id);
    for value in scope.merged_values() {
      let input = match &value {
        AttributeValue::Empty {
          kind: EmptyValue::Null,
        } => {
          debug!(plugin_id = %scope.plugin_id, "ignoring null value");
          continue;
        }
        AttributeValue::Empty {
          kind: EmptyValue::ZeroLength,
        } => "",
        AttributeValue::String { value } => value.as_str(),
        other => return Err(unsupported(other)),
      };
      match self.regex.captures(input).and_then(|c| c.get(1)) {
        Some(group) => attribute.values.push(AttributeValue::string(group.as_str())),
        None => trace!(plugin_id = %scope.plugin_id, input = %input, "regex did not match"),
      }
    }
    Ok(Some(attribute))
  }

  fn validate(&self, dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
    if self.regex.captures_len() < 2 {
      return Err("regular expression has no capture group".to_string());
    }
    require_dependencies(dependencies)
  }
}
