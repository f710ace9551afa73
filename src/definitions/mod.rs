//! Built-in attribute definition logic.

use std::collections::BTreeSet;

use crate::error::PluginError;
use crate::types::{AttributeValue, PluginDependency};

mod fn_definition;
mod mapped;
mod prescoped;
mod principal_name;
mod regex_split;
#[cfg(test)]
mod regex_split_test;
mod scoped;
mod simple;
mod template;

pub use fn_definition::FnAttributeDefinition;
pub use mapped::{MappedDefinition, SourceValue, ValueMap};
pub use prescoped::PrescopedDefinition;
pub use principal_name::PrincipalNameDefinition;
pub use regex_split::RegexSplitDefinition;
pub use scoped::ScopedDefinition;
pub use simple::SimpleDefinition;
pub use template::TemplateDefinition;

pub(crate) fn require_dependencies(dependencies: &BTreeSet<PluginDependency>) -> Result<(), String> {
  if dependencies.is_empty() {
    return Err("no dependencies were configured".to_string());
  }
  Ok(())
}

/// Anchors `pattern` so it only matches a whole value.
pub(crate) fn full_match(pattern: &str) -> Result<regex::Regex, regex::Error> {
  regex::Regex::new(&format!("^(?:{})$", pattern))
}

pub(crate) fn unsupported(value: &AttributeValue) -> PluginError {
  PluginError::UnsupportedValueType {
    expected: "string",
    found: value.type_name(),
  }
}
