//! A dependency edge from one resolver plugin to another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a producer plugin, optionally narrowed to one attribute of its output.
///
/// Identity is the `(plugin_id, attribute_id)` pair, so declaring the same
/// dependency twice collapses to a single edge in a plugin's dependency set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginDependency {
  #[serde(rename = "plugin")]
  pub plugin_id: String,
  #[serde(rename = "attribute", default, skip_serializing_if = "Option::is_none")]
  pub attribute_id: Option<String>,
}

impl PluginDependency {
  /// Depends on the whole output of `plugin_id`.
  pub fn on_plugin(plugin_id: impl Into<String>) -> Self {
    Self {
      plugin_id: plugin_id.into(),
      attribute_id: None,
    }
  }

  /// Depends on a single attribute produced by `plugin_id`.
  pub fn on_attribute(plugin_id: impl Into<String>, attribute_id: impl Into<String>) -> Self {
    Self {
      plugin_id: plugin_id.into(),
      attribute_id: Some(attribute_id.into()),
    }
  }

  pub(crate) fn with_attribute_id(mut self, attribute_id: &str) -> Self {
    self.attribute_id = Some(attribute_id.to_string());
    self
  }
}

impl fmt::Display for PluginDependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.attribute_id {
      Some(attr) => write!(f, "{}/{}", self.plugin_id, attr),
      None => write!(f, "{}", self.plugin_id),
    }
  }
}
