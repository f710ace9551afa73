//! Definition releasing its dependencies' values unchanged.

use async_trait::async_trait;

use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::Attribute;

/// Copies the merged values of every dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDefinition;

#[async_trait]
impl AttributeDefinitionLogic for SimpleDefinition {
  fn kind(&self) -> &'static str {
    "simple"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    Ok(Some(Attribute::with_values(
      scope.plugin_id,
      scope.merged_values(),
    )))
  }
}
