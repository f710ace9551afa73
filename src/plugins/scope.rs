//! What a plugin's logic can see while it resolves.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AttributeValue, PluginDependency, ResolutionContext, WorkContext};

/// Read-only view of the request and of the outputs of a plugin's dependencies.
pub struct ResolutionScope<'a> {
  pub plugin_id: &'a str,
  pub dependencies: &'a BTreeSet<PluginDependency>,
  pub context: &'a ResolutionContext,
  pub work: &'a WorkContext,
}

impl<'a> ResolutionScope<'a> {
  pub fn new(
    plugin_id: &'a str,
    dependencies: &'a BTreeSet<PluginDependency>,
    context: &'a ResolutionContext,
    work: &'a WorkContext,
  ) -> Self {
    Self {
      plugin_id,
      dependencies,
      context,
      work,
    }
  }

  pub fn principal(&self) -> Option<&str> {
    self.context.principal.as_deref()
  }

  /// All dependency values merged into a single list.
  pub fn merged_values(&self) -> Vec<AttributeValue> {
    self.work.merged_values(self.dependencies, self.plugin_id)
  }

  /// Dependency values grouped by source attribute id.
  pub fn all_values(&self) -> BTreeMap<String, Vec<AttributeValue>> {
    self.work.all_values(self.dependencies)
  }
}
