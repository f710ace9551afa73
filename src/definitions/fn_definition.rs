//! Attribute definition logic backed by a closure.

use async_trait::async_trait;

use crate::error::PluginError;
use crate::plugins::{AttributeDefinitionLogic, ResolutionScope};
use crate::types::Attribute;

type DefinitionFn =
  dyn Fn(&ResolutionScope<'_>) -> Result<Option<Attribute>, PluginError> + Send + Sync;

/// Wraps a closure as attribute definition logic.
pub struct FnAttributeDefinition {
  kind: &'static str,
  f: Box<DefinitionFn>,
}

impl FnAttributeDefinition {
  pub fn new<F>(f: F) -> Self
  where
    F: Fn(&ResolutionScope<'_>) -> Result<Option<Attribute>, PluginError> + Send + Sync + 'static,
  {
    Self {
      kind: "fn",
      f: Box::new(f),
    }
  }

  pub fn with_kind(mut self, kind: &'static str) -> Self {
    self.kind = kind;
    self
  }
}

#[async_trait]
impl AttributeDefinitionLogic for FnAttributeDefinition {
  fn kind(&self) -> &'static str {
    self.kind
  }

  async fn resolve_attribute(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<Attribute>, PluginError> {
    (self.f)(scope)
  }
}
