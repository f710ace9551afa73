//! Definition releasing the name of the principal being resolved.

use async_trait::async_trait;
use tracing::warn;

use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::Attribute;

#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalNameDefinition;

#[async_trait]
impl AttributeDefinitionLogic for PrincipalNameDefinition {
  fn kind(&self) -> &'static str {
    "principal_name"
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    match scope.principal() {
      Some(principal) => Ok(Some(Attribute::with_values(scope.plugin_id, [principal]))),
      None => {
        warn!(plugin_id = %scope.plugin_id, request_id = %scope.context.request_id, "no principal in request");
        Ok(None)
      }
    }
  }
}
