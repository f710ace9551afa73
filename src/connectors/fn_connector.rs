//! Data connector logic backed by a closure.

use async_trait::async_trait;

use crate::error::PluginError;
use crate::plugins::{DataConnectorLogic, ResolutionScope};
use crate::types::AttributeMap;

type ConnectorFn =
  dyn Fn(&ResolutionScope<'_>) -> Result<Option<AttributeMap>, PluginError> + Send + Sync;

/// Wraps a closure as data connector logic.
pub struct FnDataConnector {
  kind: &'static str,
  f: Box<ConnectorFn>,
}

impl FnDataConnector {
  pub fn new<F>(f: F) -> Self
  where
    F: Fn(&ResolutionScope<'_>) -> Result<Option<AttributeMap>, PluginError> + Send + Sync + 'static,
  {
    Self {
      kind: "fn",
      f: Box::new(f),
    }
  }

  /// Overrides the kind reported in logs.
  pub fn with_kind(mut self, kind: &'static str) -> Self {
    self.kind = kind;
    self
  }
}

#[async_trait]
impl DataConnectorLogic for FnDataConnector {
  fn kind(&self) -> &'static str {
    self.kind
  }

  async fn resolve_connector(
    &self,
    scope: &ResolutionScope<'_>,
  ) -> Result<Option<AttributeMap>, PluginError> {
    (self.f)(scope)
  }
}
